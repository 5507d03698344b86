//! CLI command handlers.

pub mod config;
pub mod start;

use std::path::Path;

use anyhow::Result;

use album_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Load configuration: an explicit file when given, layered discovery otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => Ok(LoadedConfig::from_file(path)?),
        None => Ok(LoadedConfig::discover()),
    }
}
