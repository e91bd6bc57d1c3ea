//! Session type and storage trait

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::tracked::TrackedMap;

/// User session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Unique session ID
    pub id: String,

    /// Session data; mutations mark it for saving
    pub data: TrackedMap,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Created during this request rather than loaded from the store
    pub is_new: bool,
}

impl Session {
    /// Create a new session with the given ID and lifetime
    pub fn new(id: impl Into<String>, max_age: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: TrackedMap::new(),
            created_at: now,
            expires_at: now + max_age,
            is_new: true,
        }
    }

    /// Rebuild a stored session; it starts clean
    pub fn restore(
        id: impl Into<String>,
        data: HashMap<String, serde_json::Value>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self { id: id.into(), data: TrackedMap::from_map(data), created_at, expires_at, is_new: false }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether anything changed since load
    pub fn is_dirty(&self) -> bool {
        self.data.is_dirty()
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data.get_as(key)
    }

    pub fn set<T: serde::Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        self.data.set(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }
}

/// Narrow storage interface for sessions
///
/// Implementations must be thread-safe; the pipeline calls them
/// synchronously from request tasks.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Insert or replace
    fn set(&self, session: Session) -> Result<()>;

    fn delete(&self, id: &str) -> Result<()>;

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Remove expired sessions, returning how many were dropped
    fn cleanup_expired(&self) -> Result<usize>;

    fn count(&self) -> Result<usize>;
}
