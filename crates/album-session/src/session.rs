//! Handle to one live session.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::id::SessionId;
use crate::manager::Store;

/// Handle to a session owned by a [`SessionManager`](crate::SessionManager).
///
/// The handle holds only the identifier; the attributes live in the store.
/// Every attribute call counts as an access: it refreshes the session's
/// timestamp and moves it to the front of the recency order.
///
/// Once the session is destroyed, renewed or swept, the handle is detached:
/// reads return `None` and writes are ignored.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<Mutex<Store>>,
}

impl Session {
    pub(crate) fn new(id: SessionId, store: Arc<Mutex<Store>>) -> Self {
        Self { id, store }
    }

    /// The session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get an attribute value.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut store = self.store.lock();
        let now = Instant::now();
        store.touch(self.id.as_str(), now)?.attributes.get(key).cloned()
    }

    /// Insert or overwrite an attribute.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut store = self.store.lock();
        let now = Instant::now();
        if let Some(entry) = store.touch(self.id.as_str(), now) {
            entry.attributes.insert(key.into(), value.into());
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn delete(&self, key: &str) -> Option<String> {
        let mut store = self.store.lock();
        let now = Instant::now();
        store.touch(self.id.as_str(), now)?.attributes.remove(key)
    }

    /// Whether the session is still held by the store.
    pub fn is_live(&self) -> bool {
        self.store.lock().peek(self.id.as_str()).is_some()
    }

    /// When the session was last accessed, without counting as an access.
    pub fn last_accessed(&self) -> Option<Instant> {
        self.store
            .lock()
            .peek(self.id.as_str())
            .map(|entry| entry.last_accessed)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{SessionConfig, SessionManager};
    use std::thread;
    use std::time::Duration;

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig::default())
    }

    #[test]
    fn test_set_then_get() {
        let session = manager().start(None).unwrap();
        session.set("status", "OK");

        assert_eq!(session.get("status").as_deref(), Some("OK"));
    }

    #[test]
    fn test_set_overwrites() {
        let session = manager().start(None).unwrap();
        session.set("status", "pending");
        session.set("status", "OK");

        assert_eq!(session.get("status").as_deref(), Some("OK"));
    }

    #[test]
    fn test_get_missing_key() {
        let session = manager().start(None).unwrap();
        assert_eq!(session.get("never-set"), None);
    }

    #[test]
    fn test_delete() {
        let session = manager().start(None).unwrap();
        session.set("status", "OK");

        assert_eq!(session.delete("status").as_deref(), Some("OK"));
        assert_eq!(session.get("status"), None);

        // Deleting again is a no-op
        assert_eq!(session.delete("status"), None);
    }

    #[test]
    fn test_attribute_calls_refresh_timestamp() {
        let session = manager().start(None).unwrap();
        let created = session.last_accessed().unwrap();

        thread::sleep(Duration::from_millis(5));
        session.get("missing");
        let after_get = session.last_accessed().unwrap();
        assert!(after_get > created);

        thread::sleep(Duration::from_millis(5));
        session.set("status", "OK");
        let after_set = session.last_accessed().unwrap();
        assert!(after_set > after_get);

        thread::sleep(Duration::from_millis(5));
        session.delete("missing");
        assert!(session.last_accessed().unwrap() > after_set);
    }

    #[test]
    fn test_last_accessed_does_not_touch() {
        let session = manager().start(None).unwrap();
        let first = session.last_accessed().unwrap();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(session.last_accessed().unwrap(), first);
    }

    #[test]
    fn test_detached_handle() {
        let manager = manager();
        let session = manager.start(None).unwrap();
        session.set("status", "OK");
        manager.destroy(session.id().as_str());

        assert!(!session.is_live());
        assert_eq!(session.get("status"), None);
        assert_eq!(session.last_accessed(), None);

        // Writes do not resurrect it
        session.set("status", "OK");
        assert!(!session.is_live());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_debug_hides_identifier() {
        let session = manager().start(None).unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains(session.id().as_str()));
    }
}
