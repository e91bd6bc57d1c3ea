//! Key-value container that remembers whether it was modified

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Owned map plus a dirty flag set by every mutation
///
/// # Example
///
/// ```rust
/// use quill_core::session::TrackedMap;
///
/// let mut map = TrackedMap::new();
/// assert!(!map.is_dirty());
/// map.set("user", "ada").unwrap();
/// assert!(map.is_dirty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedMap {
    inner: HashMap<String, Value>,
    dirty: bool,
}

impl TrackedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing data; the result starts clean
    pub fn from_map(inner: HashMap<String, Value>) -> Self {
        Self { inner, dirty: false }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Deserialize a value; `None` when missing or of another shape
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.inner.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.dirty = true;
        self.inner.insert(key.into(), value)
    }

    /// Serialize and store a value
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> anyhow::Result<()> {
        let value = serde_json::to_value(value)?;
        self.insert(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.dirty = true;
        self.inner.remove(key)
    }

    pub fn clear(&mut self) {
        self.dirty = true;
        self.inner.clear();
    }

    /// Mutable access to one value; counts as a modification
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.dirty = true;
        self.inner.get_mut(key)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.inner
    }
}
