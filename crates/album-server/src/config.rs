//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default directory for uploaded images.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default max body size for upload requests (32 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Shared login password. `None` refuses every login.
    pub password: Option<String>,

    /// Directory uploaded images are stored in.
    pub upload_dir: PathBuf,

    /// Enable request logging.
    pub request_logging: bool,

    /// Maximum upload request body size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 80)),
            password: None,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            request_logging: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with an optional login password.
    pub fn new(password: Option<String>) -> Self {
        Self {
            password,
            ..Default::default()
        }
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the upload directory.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set the maximum upload body size.
    pub fn with_max_upload_bytes(mut self, size: usize) -> Self {
        self.max_upload_bytes = size;
        self
    }
}
