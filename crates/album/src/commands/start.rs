//! Start command - launches the album server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use album_config::{AlbumConfig, AuthConfig};
use album_server::{Server, ServerConfig};
use album_session::{SessionConfig, SessionManager};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Directory uploads are stored in (overrides config)
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Login password (or set ALBUM_PASSWORD env var)
    #[arg(long, env = "ALBUM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let loaded = super::load_config(args.config.as_deref())?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let mut config = loaded.config;
    apply_overrides(&mut config, &args);
    config.validate()?;

    // ── Server settings ─────────────────────────────────────────────────

    let server_cfg = config.server();
    let ip: IpAddr = server_cfg
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", server_cfg.bind))?;
    let addr = SocketAddr::new(ip, server_cfg.port);

    let auth = config.auth();
    if !auth.has_password() {
        warn!("No password configured, every login will be refused");
        eprintln!("warning: no password configured (set [auth] password or ALBUM_PASSWORD); every login will be refused");
    }

    let server_config = ServerConfig::new(auth.password.filter(|p| !p.is_empty()))
        .with_bind_address(addr)
        .with_upload_dir(server_cfg.upload_dir.clone())
        .with_request_logging(server_cfg.request_logging)
        .with_max_upload_bytes(server_cfg.max_upload_bytes);

    // ── Session store ───────────────────────────────────────────────────

    let sessions = SessionManager::new(session_config(&config));
    if ctx.verbose {
        println!(
            "Sessions: cookie={}, max idle={}s, sweep every {:?}",
            sessions.config().cookie_name,
            sessions.config().max_idle_secs(),
            sessions.config().sweep_interval()
        );
    }
    let sweeper = sessions.spawn_sweeper();

    // ── Start server ────────────────────────────────────────────────────

    let server = Server::new(server_config, sessions)?;

    println!("Album server starting on http://{}", addr);
    println!("Uploads: {}", server_cfg.upload_dir.display());
    println!("Press Ctrl+C to stop");

    let result = server.run_with_shutdown(addr, shutdown_signal()).await;

    // ── Graceful shutdown ──────────────────────────────────────────────

    sweeper.shutdown().await;
    info!("Session sweeper stopped");

    result?;
    Ok(())
}

/// Fold CLI flags into the loaded configuration.
fn apply_overrides(config: &mut AlbumConfig, args: &StartArgs) {
    if args.port.is_some() || args.bind.is_some() || args.upload_dir.is_some() {
        let mut server = config.server();
        if let Some(port) = args.port {
            server.port = port;
        }
        if let Some(ref bind) = args.bind {
            server.bind = bind.clone();
        }
        if let Some(ref dir) = args.upload_dir {
            server.upload_dir = dir.clone();
        }
        config.server = Some(server);
    }

    if let Some(ref password) = args.password {
        config.auth = Some(AuthConfig {
            password: Some(password.clone()),
        });
    }
}

/// Session store settings from the `[session]` section.
fn session_config(config: &AlbumConfig) -> SessionConfig {
    let section = config.session();
    let session = SessionConfig::default()
        .with_cookie_name(section.cookie_name.clone())
        .with_max_idle(section.max_idle());

    match section.sweep_interval() {
        Some(interval) => session.with_sweep_interval(interval),
        None => session,
    }
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
