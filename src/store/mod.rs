//! Durable content store.
//!
//! A string-keyed store of JSON-serialized values, scoped to the local
//! profile. Keys are namespaced with `/` (e.g. `documents/<account-id>`).
//! There is no expiry and no transactional guarantee across keys; callers
//! that need multi-key consistency must tolerate a crash between writes.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure while touching a key.
    #[error("store I/O failure for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored value exists but is not the JSON shape the caller expects.
    #[error("stored value for key '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized for storage.
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key is empty or contains an invalid path segment.
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    /// No platform data directory could be determined.
    #[error("could not determine a data directory for the store")]
    NoDataDir,
}

/// String-keyed durable storage.
///
/// Implementations must make `set` visible to every subsequent `get` from
/// the same process, and `FileStore` additionally survives restarts.
pub trait ContentStore: Send {
    /// Fetch the raw value for a key, `None` when absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store a raw value under a key, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Read a key and deserialize it as `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn ContentStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .map_err(|source| StoreError::Corrupt { key: key.to_string(), source })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and store it under `key`.
pub fn write_json<T: Serialize>(
    store: &mut dyn ContentStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|source| StoreError::Serialize { key: key.to_string(), source })?;
    store.set(key, &raw)
}

/// Validate a key and split it into sanitized path segments.
///
/// Each `/`-separated segment must be non-empty and may only contain
/// alphanumerics, `.`, `_` and `-`; `.` and `..` segments are rejected so a
/// key can never escape the store root.
pub(crate) fn key_segments(key: &str) -> StoreResult<Vec<String>> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }

    let mut segments = Vec::new();
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let clean: String = segment
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
            .collect();
        segments.push(clean);
    }

    Ok(segments)
}
