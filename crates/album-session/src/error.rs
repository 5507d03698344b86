//! Error types for session store operations.

/// Error type for session store operations.
///
/// Unknown tokens and missing attributes are not errors; the only failure
/// the store reports is being unable to mint a safe identifier.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The random source could not produce a usable identifier.
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
