//! # JSON File Storage
//!
//! All keys live in one JSON object on disk. Every write serializes the whole
//! object to a sibling temp file and renames it over the original, so a crash
//! mid-write leaves the previous document intact.

use super::KeyValueStore;
use crate::CharadexError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File-backed key-value store.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStorage {
    /// Open the document at `path`. A missing file is an empty store; the
    /// file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CharadexError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => match serde_json::from_str::<Value>(&text)
                .map_err(|e| CharadexError::SerializationError(e.to_string()))?
            {
                Value::Object(map) => map,
                _ => {
                    return Err(CharadexError::SerializationError(format!(
                        "{} does not contain a JSON object",
                        path.display()
                    )));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(CharadexError::IoError(e.to_string())),
        };
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<(), CharadexError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CharadexError::IoError(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| CharadexError::SerializationError(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text).map_err(|e| CharadexError::IoError(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| CharadexError::IoError(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, CharadexError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, Value)]) -> Result<(), CharadexError> {
        let mut next = self.entries.clone();
        for (key, value) in entries {
            next.insert((*key).to_string(), value.clone());
        }
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}
