use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::DEFAULT_TIMEOUT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory scanned when `--root` is not given.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub git_program: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_include_untracked")]
    pub include_untracked: bool,
}

fn default_include_untracked() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: None,
            git_program: None,
            timeout_secs: None,
            include_untracked: default_include_untracked(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).context("read config")?;
        let config = serde_json::from_str(&data).context("parse config")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create config directory")?;
        }
        let data = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, data).context("write config")?;
        Ok(())
    }

    pub fn git_program(&self) -> &str {
        self.git_program.as_deref().unwrap_or("git")
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

pub(crate) fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("com", "repo-sweep", "repo-sweep").context("resolve project dirs")
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}
