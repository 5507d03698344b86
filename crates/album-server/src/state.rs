//! Application state shared across handlers.

use std::sync::Arc;

use album_session::SessionManager;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::PhotoStore;
use crate::templates::Templates;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Session store. Constructed by the caller so the sweeper can share it.
    pub sessions: SessionManager,

    /// Uploaded images.
    pub photos: Arc<PhotoStore>,

    /// Page templates.
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: ServerConfig, sessions: SessionManager) -> Result<Self> {
        let photos = PhotoStore::new(config.upload_dir.clone());
        Ok(Self {
            config: Arc::new(config),
            sessions,
            photos: Arc::new(photos),
            templates: Arc::new(Templates::new()?),
        })
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.sessions.config().cookie_name
    }
}
