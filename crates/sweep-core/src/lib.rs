pub mod audit;
pub mod command;
pub mod config;
pub mod detector;
pub mod error;
pub mod manifest;
pub mod repo_status;
pub mod scanner;
pub mod sync_engine;
