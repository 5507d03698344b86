//! Config command - inspect the resolved configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use album_config::{AlbumConfig, AuthConfig, LoadedConfig};

use super::Context;

/// Placeholder printed instead of the configured password.
const REDACTED: &str = "<redacted>";

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to config file (overrides default discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML (default)
    Show,

    /// Show which config files are loaded and their precedence
    Which,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let loaded = super::load_config(args.config.as_deref())?;

    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => cmd_show(&loaded, ctx),
        ConfigCommand::Which => cmd_which(&loaded),
    }
}

fn cmd_show(loaded: &LoadedConfig, ctx: &Context) -> Result<()> {
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            eprintln!("No config files loaded (using defaults)");
        }
        for source in sources {
            eprintln!("Loaded config: {}", source.display());
        }
    }

    print!("{}", effective(&loaded.config).to_toml()?);
    Ok(())
}

fn cmd_which(loaded: &LoadedConfig) -> Result<()> {
    println!("Config file search order (later overrides earlier):\n");

    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {}", status, source.path.display());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found, defaults apply.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

/// Every section filled in with its defaults, password masked.
fn effective(config: &AlbumConfig) -> AlbumConfig {
    let auth = config.auth();
    let password = auth.has_password().then(|| REDACTED.to_string());

    AlbumConfig {
        server: Some(config.server()),
        auth: Some(AuthConfig { password }),
        session: Some(config.session()),
    }
}
