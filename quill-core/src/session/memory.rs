//! In-memory session storage
//!
//! Sessions are lost on restart. Suitable for development and
//! single-process deployments.

use super::store::{Session, SessionStore};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe session storage using `RwLock<HashMap>`
///
/// Clones share the same underlying map.
///
/// # Example
///
/// ```
/// use quill_core::session::MemorySessionStore;
///
/// let store = MemorySessionStore::new();
/// ```
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Session>>> {
        self.sessions.read().map_err(|_| anyhow!("session store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Session>>> {
        self.sessions.write().map_err(|_| anyhow!("session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn set(&self, session: Session) -> Result<()> {
        self.write()?.insert(session.id.clone(), session);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.write()?.remove(id);
        Ok(())
    }

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(id))
    }

    fn cleanup_expired(&self) -> Result<usize> {
        let mut sessions = self.write()?;
        let initial_count = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        Ok(initial_count - sessions.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore").field("sessions", &self.count().unwrap_or(0)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_memory_store_basic() {
        let store = MemorySessionStore::new();

        let mut session = Session::new("test-123", Duration::hours(1));
        session.set("user_id", "alice").unwrap();
        store.set(session).unwrap();

        let retrieved = store.get("test-123").unwrap().unwrap();
        assert_eq!(retrieved.id, "test-123");
        assert_eq!(retrieved.get::<String>("user_id"), Some("alice".to_string()));
        assert!(store.exists("test-123").unwrap());
    }

    #[test]
    fn test_memory_store_delete() {
        let store = MemorySessionStore::new();
        store.set(Session::new("gone", Duration::hours(1))).unwrap();
        store.delete("gone").unwrap();

        assert!(store.get("gone").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = MemorySessionStore::new();
        store.set(Session::new("fresh", Duration::hours(1))).unwrap();
        store.set(Session::new("stale", Duration::seconds(-5))).unwrap();

        assert_eq!(store.cleanup_expired().unwrap(), 1);
        assert!(store.exists("fresh").unwrap());
        assert!(!store.exists("stale").unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemorySessionStore::new();
        let clone = store.clone();
        clone.set(Session::new("shared", Duration::hours(1))).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
