//! In-memory content store for tests and ephemeral sessions.

use std::collections::HashMap;

use super::{key_segments, ContentStore, StoreResult};

/// HashMap-backed store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ContentStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        key_segments(key)?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        key_segments(key)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        key_segments(key)?;
        self.values.remove(key);
        Ok(())
    }
}
