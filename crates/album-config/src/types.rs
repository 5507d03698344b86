//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]     # listener and upload storage
//! [auth]       # shared login password
//! [session]    # session cookie and idle lifetime
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default configuration values.
pub mod defaults {
    /// Default bind address.
    pub const BIND: &str = "0.0.0.0";
    /// Default listen port.
    pub const PORT: u16 = 80;
    /// Default directory for uploaded images.
    pub const UPLOAD_DIR: &str = "./uploads";
    /// Default upper bound on an upload request body (32 MiB).
    pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
    /// Default session cookie name.
    pub const COOKIE_NAME: &str = "baophotos";
    /// Default idle lifetime of a session, in seconds.
    pub const MAX_IDLE_SECS: u64 = 300;
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumConfig {
    /// Server configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Login configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Session store configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,
}

impl AlbumConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: AlbumConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.auth.is_some() {
            self.auth = other.auth;
        }

        if other.session.is_some() {
            self.session = other.session;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Auth section, or defaults.
    pub fn auth(&self) -> AuthConfig {
        self.auth.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Check values that would only fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        let session = self.session();
        if session.max_idle_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "session.max_idle_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if session.sweep_interval_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "session.sweep_interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if !is_cookie_token(&session.cookie_name) {
            return Err(ConfigError::Invalid {
                field: "session.cookie_name".to_string(),
                reason: format!("'{}' is not a valid cookie name", session.cookie_name),
            });
        }

        let server = self.server();
        if server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "server.max_upload_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// RFC 6265 cookie-name characters (an HTTP token).
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory uploaded images are stored in.
    pub upload_dir: PathBuf,
    /// Enable request logging.
    pub request_logging: bool,
    /// Maximum size of an upload request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::BIND.to_string(),
            port: defaults::PORT,
            upload_dir: PathBuf::from(defaults::UPLOAD_DIR),
            request_logging: true,
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Login configuration section.
///
/// ```toml
/// [auth]
/// password = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared password. `None` means every login attempt is refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AuthConfig {
    /// Whether a non-empty password is configured.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration section.
///
/// ```toml
/// [session]
/// cookie_name = "baophotos"
/// max_idle_secs = 300
/// sweep_interval_secs = 60
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Seconds a session may stay idle before it is evicted.
    pub max_idle_secs: u64,
    /// Seconds between sweeps. Defaults to `max_idle_secs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::COOKIE_NAME.to_string(),
            max_idle_secs: defaults::MAX_IDLE_SECS,
            sweep_interval_secs: None,
        }
    }
}

impl SessionConfig {
    /// Idle lifetime as a duration.
    pub fn max_idle(&self) -> Duration {
        Duration::from_secs(self.max_idle_secs)
    }

    /// Sweep period as a duration, if set explicitly.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
