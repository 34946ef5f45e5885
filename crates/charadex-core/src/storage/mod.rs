//! # Durable Key-Value Storage
//!
//! The favorites store persists two logical keys, each holding a JSON value:
//! - [`STARRED_KEY`]: array of full character records
//! - [`COMMENTS_KEY`]: object mapping character id to comment text
//!
//! ## Backends
//!
//! - `InMemory`: volatile map, used by tests and `--backend memory`
//! - `File`: a single JSON document on disk, rewritten atomically
//! - `Persistent`: a redb database (ACID, crash safe)

mod json_file;
mod memory;
mod redb_store;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use redb_store::RedbStorage;

use crate::CharadexError;
use serde_json::Value;
use std::path::Path;

/// Key holding the starred character list.
pub const STARRED_KEY: &str = "starred-characters";

/// Key holding the id → comment map.
pub const COMMENTS_KEY: &str = "character-comments";

/// Minimal key-value contract the favorites store needs.
pub trait KeyValueStore {
    /// Read the JSON value under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<Value>, CharadexError>;

    /// Write several keys as one unit: either all land or none do.
    fn set_many(&mut self, entries: &[(&str, Value)]) -> Result<(), CharadexError>;

    /// Write a single key.
    fn set(&mut self, key: &str, value: Value) -> Result<(), CharadexError> {
        self.set_many(&[(key, value)])
    }
}

/// Storage backend selected at startup.
#[derive(Debug)]
pub enum StorageBackend {
    InMemory(MemoryStorage),
    File(JsonFileStorage),
    Persistent(RedbStorage),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStorage::default())
    }
}

impl StorageBackend {
    /// Open a backend by name: `"file"`, `"redb"` or `"memory"`.
    pub fn open(kind: &str, path: impl AsRef<Path>) -> Result<Self, CharadexError> {
        match kind {
            "file" => Ok(Self::File(JsonFileStorage::open(path)?)),
            "redb" => Ok(Self::Persistent(RedbStorage::open(path)?)),
            "memory" => Ok(Self::default()),
            other => Err(CharadexError::InvalidParam {
                key: "backend".to_string(),
                value: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::InMemory(_))
    }
}

impl KeyValueStore for StorageBackend {
    fn get(&self, key: &str) -> Result<Option<Value>, CharadexError> {
        match self {
            Self::InMemory(s) => s.get(key),
            Self::File(s) => s.get(key),
            Self::Persistent(s) => s.get(key),
        }
    }

    fn set_many(&mut self, entries: &[(&str, Value)]) -> Result<(), CharadexError> {
        match self {
            Self::InMemory(s) => s.set_many(entries),
            Self::File(s) => s.set_many(entries),
            Self::Persistent(s) => s.set_many(entries),
        }
    }
}
