use crate::token_store;
use anyhow::Context;
use clap::Parser;
use std::cell::Cell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use sweep_core::audit::AuditLogger;
use sweep_core::command::GitCommandRunner;
use sweep_core::config::{AppConfig, default_config_path};
use sweep_core::manifest::try_bump_patch_version;
use sweep_core::scanner::discover;
use sweep_core::sync_engine::{
    RunReport, RunSummary, SyncOptions, SyncProgress, SyncStep, fetch_and_pull_all,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod args;
mod bump_cmd;
mod config_cmd;
mod render;
mod sync_cmd;
mod token_cmd;

use args::*;

use bump_cmd::handle_bump;
use config_cmd::handle_config;
use sync_cmd::{handle_list, handle_sync};
use token_cmd::handle_token;

/// Filter used when `RUST_LOG` is unset; keeps stderr quiet next to the
/// progress line.
const DEFAULT_LOG_FILTER: &str = "warn";

pub fn run() -> anyhow::Result<()> {
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    info!(command = command_label(&cli.command), "Running command");
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Sync(args) => handle_sync(args, &config_path),
        Commands::List(args) => handle_list(args, &config_path),
        Commands::Bump(args) => handle_bump(args),
        Commands::Token(args) => handle_token(args),
        Commands::Config(args) => handle_config(args, &config_path),
    }
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Sync(_) => "sync",
        Commands::List(_) => "list",
        Commands::Bump(_) => "bump",
        Commands::Token(_) => "token",
        Commands::Config(_) => "config",
    }
}

/// `--root`, then the configured root, then the current directory.
fn resolve_root(arg: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<PathBuf> {
    if let Some(root) = arg.or_else(|| config.root.clone()) {
        return Ok(root);
    }
    std::env::current_dir().context("resolve current directory")
}
