//! Session identifiers and the random source they are drawn from.

use std::borrow::Borrow;
use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Number of random bytes in a session identifier (256 bits).
pub const ID_BYTES: usize = 32;

/// Characters of an identifier shown in logs and `Debug` output.
const LOG_PREFIX_LEN: usize = 8;

/// Source of the random bytes behind session identifiers.
///
/// Implementations must be cryptographically strong. A source that cannot
/// deliver must return an error rather than filling the buffer with
/// predictable bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// The operating system's random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| Error::Entropy(e.to_string()))
    }
}

/// Opaque, URL-safe session identifier.
///
/// `Display` yields the full token (for cookies); `Debug` only shows a
/// short prefix so identifiers do not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Draw a fresh identifier from `source`.
    pub fn generate(source: &dyn EntropySource) -> Result<Self> {
        let mut bytes = [0u8; ID_BYTES];
        source.fill(&mut bytes)?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub(crate) fn from_raw(token: String) -> Self {
        Self(token)
    }

    /// The full token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix suitable for log fields.
    pub fn short(&self) -> &str {
        short(&self.0)
    }
}

/// Prefix of a raw token, for log fields.
pub(crate) fn short(token: &str) -> &str {
    match token.char_indices().nth(LOG_PREFIX_LEN) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({}…)", self.short())
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
