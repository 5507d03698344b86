//! In-memory session store for the photo album.
//!
//! This crate owns every live [`Session`] and provides:
//! - Unguessable identifiers drawn from the OS random source
//! - Recency ordering so idle sessions are found without a full scan
//! - A periodic sweeper that evicts sessions idle longer than the configured lifetime
//! - One lock around the whole store, so lookup-or-create is atomic
//!
//! # Example
//!
//! ```rust,ignore
//! use album_session::{SessionConfig, SessionManager};
//!
//! let manager = SessionManager::new(SessionConfig::default());
//! let sweeper = manager.spawn_sweeper();
//!
//! let session = manager.start(cookie.as_deref())?;
//! session.set("status", "OK");
//!
//! sweeper.shutdown().await;
//! ```

mod config;
mod error;
mod id;
mod manager;
mod session;
mod sweeper;

pub use config::{DEFAULT_COOKIE_NAME, DEFAULT_MAX_IDLE, SessionConfig};
pub use error::{Error, Result};
pub use id::{EntropySource, ID_BYTES, OsEntropy, SessionId};
pub use manager::{SessionManager, SessionStats};
pub use session::Session;
pub use sweeper::SweeperHandle;
