//! Configuration system for the photo album service.
//!
//! Provides TOML-based configuration with:
//! - `[server]`: bind address, port, upload directory, request logging
//! - `[auth]`: the shared login password
//! - `[session]`: cookie name and idle lifetime of sessions
//!
//! Config files are layered (user config dir, then project-local
//! `album.toml`); CLI flags are applied on top by the binary.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{ConfigSource, LoadedConfig, config_dir, read_file};
pub use error::{ConfigError, Result};
pub use types::*;
