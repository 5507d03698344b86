//! Session manager: owns every live session and evicts idle ones.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::id::{self, EntropySource, OsEntropy, SessionId};
use crate::session::Session;

/// How many identifiers to draw before concluding the random source is broken.
const MAX_ID_ATTEMPTS: usize = 8;

/// State kept for one live session.
#[derive(Debug)]
pub(crate) struct Entry {
    /// Attribute values.
    pub(crate) attributes: HashMap<String, String>,

    /// Last time the session was resolved or had an attribute touched.
    pub(crate) last_accessed: Instant,

    /// Stale tokens that were redirected to this session.
    forwarded_from: Vec<String>,
}

impl Entry {
    fn new(attributes: HashMap<String, String>, now: Instant) -> Self {
        Self {
            attributes,
            last_accessed: now,
            forwarded_from: Vec::new(),
        }
    }
}

/// The session map and its recency order, plus forwarded tokens.
///
/// `LruCache` is a hash map threaded through a doubly linked list, so the
/// map and the recency order are one structure and cannot disagree. Every
/// method here leaves `sessions` and `forwards` consistent with each other.
///
/// Timestamps passed in must be read while holding the lock, which keeps
/// the recency order sorted by `last_accessed`.
pub(crate) struct Store {
    /// Live sessions, most recently used at the front.
    sessions: LruCache<SessionId, Entry>,

    /// Stale token -> session created in its place.
    forwards: HashMap<String, SessionId>,
}

impl Store {
    fn new() -> Self {
        Self {
            sessions: LruCache::unbounded(),
            forwards: HashMap::new(),
        }
    }

    /// Map a presented token to the live session it names, if any.
    fn resolve(&self, token: &str) -> Option<SessionId> {
        if self.sessions.contains(token) {
            return Some(SessionId::from_raw(token.to_string()));
        }
        self.forwards.get(token).cloned()
    }

    /// Mark a session as accessed: refresh its timestamp and move it to the
    /// front of the recency order.
    pub(crate) fn touch(&mut self, id: &str, now: Instant) -> Option<&mut Entry> {
        let entry = self.sessions.get_mut(id)?;
        if now > entry.last_accessed {
            entry.last_accessed = now;
        }
        Some(entry)
    }

    /// Read an entry without touching it.
    pub(crate) fn peek(&self, id: &str) -> Option<&Entry> {
        self.sessions.peek(id)
    }

    fn insert(&mut self, id: SessionId, entry: Entry) {
        self.sessions.put(id, entry);
    }

    fn forward(&mut self, token: &str, id: &SessionId) {
        if let Some(entry) = self.sessions.peek_mut(id.as_str()) {
            entry.forwarded_from.push(token.to_string());
            self.forwards.insert(token.to_string(), id.clone());
        }
    }

    /// Remove a session together with every token forwarded to it.
    fn remove(&mut self, id: &str) -> Option<Entry> {
        let entry = self.sessions.pop(id)?;
        self.drop_forwards(&entry);
        Some(entry)
    }

    fn drop_forwards(&mut self, entry: &Entry) {
        for token in &entry.forwarded_from {
            self.forwards.remove(token);
        }
    }

    /// Whether `token` is already bound to something.
    fn is_taken(&self, token: &str) -> bool {
        self.sessions.contains(token) || self.forwards.contains_key(token)
    }

    /// Evict from the least recently used end every session last accessed
    /// at or before `cutoff`. Stops at the first session still in the window.
    fn evict_idle(&mut self, cutoff: Instant) -> usize {
        let mut evicted = 0;
        loop {
            let expired = matches!(
                self.sessions.peek_lru(),
                Some((_, entry)) if entry.last_accessed <= cutoff
            );
            if !expired {
                break;
            }
            if let Some((id, entry)) = self.sessions.pop_lru() {
                trace!(session = id.short(), "Evicting idle session");
                self.drop_forwards(&entry);
                evicted += 1;
            }
        }
        evicted
    }
}

/// Owns all live sessions.
///
/// Cloning is cheap; clones share the same store. Every operation takes the
/// single store lock for its whole duration, so "look up, else create" in
/// [`start`](Self::start) is atomic and no caller ever observes the session
/// map and the recency order out of step.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Mutex<Store>>,
    config: Arc<SessionConfig>,
    entropy: Arc<dyn EntropySource>,
}

impl SessionManager {
    /// Create a manager that draws identifiers from the OS random source.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_entropy(config, OsEntropy)
    }

    /// Create a manager with a custom random source.
    pub fn with_entropy(config: SessionConfig, entropy: impl EntropySource + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Store::new())),
            config: Arc::new(config),
            entropy: Arc::new(entropy),
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve the token a request presented to a session, creating one if needed.
    ///
    /// - No token (or an empty one): a new session with a fresh identifier.
    /// - A token naming a live session: that session, marked as accessed.
    /// - Any other token: a new session with a *fresh* identifier. The stale
    ///   token is remembered as forwarding to the new session, so concurrent
    ///   requests carrying the same stale token all land on one session.
    ///
    /// Callers compare [`Session::id`] with the presented token to decide
    /// whether the client needs the new identifier.
    pub fn start(&self, token: Option<&str>) -> Result<Session> {
        let token = token.filter(|t| !t.is_empty());
        let mut store = self.inner.lock();
        let now = Instant::now();

        if let Some(token) = token
            && let Some(id) = store.resolve(token)
        {
            store.touch(id.as_str(), now);
            trace!(session = id.short(), "Session resolved");
            return Ok(Session::new(id, Arc::clone(&self.inner)));
        }

        let id = self.fresh_id(&store)?;
        store.insert(id.clone(), Entry::new(HashMap::new(), now));

        match token {
            Some(stale) => {
                store.forward(stale, &id);
                debug!(
                    session = id.short(),
                    stale = id::short(stale),
                    "Session created for unknown token"
                );
            }
            None => debug!(session = id.short(), "Session created"),
        }

        Ok(Session::new(id, Arc::clone(&self.inner)))
    }

    /// Remove the session `token` names, if any.
    ///
    /// Returns whether a session was removed. Forwarded tokens are dropped
    /// with it, so a later [`start`](Self::start) with the same token gets a
    /// brand-new session.
    pub fn destroy(&self, token: &str) -> bool {
        let mut store = self.inner.lock();
        let Some(id) = store.resolve(token) else {
            return false;
        };
        let removed = store.remove(id.as_str()).is_some();
        if removed {
            debug!(session = id.short(), "Session destroyed");
        }
        removed
    }

    /// Move a session's attributes to a freshly generated identifier.
    ///
    /// The old identifier, and any token forwarded to it, stop resolving.
    /// Meant for privilege changes such as login, so a token planted before
    /// authentication is worthless afterwards. Renewing a session that is no
    /// longer live yields an empty new session.
    pub fn renew(&self, session: &Session) -> Result<Session> {
        let mut store = self.inner.lock();
        let now = Instant::now();

        let id = self.fresh_id(&store)?;
        let attributes = store
            .remove(session.id().as_str())
            .map(|entry| entry.attributes)
            .unwrap_or_default();
        store.insert(id.clone(), Entry::new(attributes, now));

        debug!(
            old = session.id().short(),
            session = id.short(),
            "Session renewed"
        );

        Ok(Session::new(id, Arc::clone(&self.inner)))
    }

    /// Evict every session idle for at least the configured lifetime.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Evict every session last accessed at or before `now - max_idle`.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let Some(cutoff) = now.checked_sub(self.config.max_idle) else {
            return 0;
        };

        let mut store = self.inner.lock();
        let evicted = store.evict_idle(cutoff);
        if evicted > 0 {
            debug!(
                count = evicted,
                remaining = store.sessions.len(),
                "Swept idle sessions"
            );
        }
        evicted
    }

    /// Whether `token` currently resolves to a live session. Does not count
    /// as an access.
    pub fn contains(&self, token: &str) -> bool {
        self.inner.lock().resolve(token).is_some()
    }

    /// Get the number of live sessions.
    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// Check if there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().sessions.is_empty()
    }

    /// Get store statistics.
    pub fn stats(&self) -> SessionStats {
        let store = self.inner.lock();
        SessionStats {
            sessions: store.sessions.len(),
            forwards: store.forwards.len(),
        }
    }

    /// Draw an identifier not bound to any live session or forward.
    fn fresh_id(&self, store: &Store) -> Result<SessionId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = SessionId::generate(self.entropy.as_ref())?;
            if !store.is_taken(id.as_str()) {
                return Ok(id);
            }
            warn!(session = id.short(), "Generated identifier already in use");
        }
        Err(Error::Entropy(format!(
            "no unused identifier after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of live sessions.
    pub sessions: usize,

    /// Number of stale tokens forwarded to live sessions.
    pub forwards: usize,
}
