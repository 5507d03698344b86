//! HTTP server for the photo album.
//!
//! Serves a password-protected album: a login form, an upload form, a listing
//! of uploaded images and the images themselves. Login state lives in an
//! in-memory [`SessionManager`] keyed by a cookie.
//!
//! # Features
//!
//! - Cookie-bound sessions from `album-session`
//! - Constant-time password check, session renewal on login
//! - Multipart uploads into a flat directory
//! - Request logging
//!
//! # Example
//!
//! ```ignore
//! use album_server::{Server, ServerConfig};
//! use album_session::{SessionConfig, SessionManager};
//!
//! let sessions = SessionManager::new(SessionConfig::default());
//! let config = ServerConfig::new(Some("secret".to_string()))
//!     .with_bind_address("127.0.0.1:8080".parse()?);
//!
//! let server = Server::new(config, sessions)?;
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod cookie;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod storage;
pub mod templates;

pub use auth::{AUTH_OK, AUTH_STATUS_KEY, require_login, session_middleware};
pub use config::ServerConfig;
pub use cookie::CookieAction;
pub use error::{Result, ServerError};
pub use logging::request_logging_middleware;
pub use state::AppState;
pub use storage::PhotoStore;

use std::net::SocketAddr;

use album_session::SessionManager;
use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The album HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration and session store.
    pub fn new(config: ServerConfig, sessions: SessionManager) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config, sessions)?,
        })
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            // Health routes (no session)
            .merge(routes::health_routes())
            .merge(self.page_routes())
            // Request logging (inner layer, runs first)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Browser-facing pages.
    ///
    /// Every page gets a session; album pages additionally require login.
    fn page_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        let album = Router::new()
            .route("/", get(routes::list_handler))
            .route(
                "/upload",
                get(routes::upload_page).post(routes::upload_handler),
            )
            .route("/view", get(routes::view_handler))
            .route_layer(middleware::from_fn(auth::require_login));

        Router::new()
            .route(
                "/login",
                get(routes::login_page).post(routes::login_submit),
            )
            .route("/logout", post(routes::logout))
            .merge(album)
            .layer(DefaultBodyLimit::max(self.state.config.max_upload_bytes))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::session_middleware,
            ))
    }

    /// Run the server on the configured address until the process ends.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_with_shutdown(addr, std::future::pending()).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        self.run_with_shutdown(addr, std::future::pending()).await
    }

    /// Run the server on `addr` until `shutdown` completes, then drain
    /// in-flight requests.
    pub async fn run_with_shutdown<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.photos.ensure_dir().await?;
        let router = self.router();

        info!(
            "Starting server on {} (uploads in {})",
            addr,
            self.state.photos.dir().display()
        );

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    /// Get the shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
