//! # redb-backed Storage
//!
//! A disk-backed key-value table using the redb embedded database.
//!
//! Values are stored as JSON text so the on-disk payload matches the file
//! backend byte for byte. Multi-key writes share one write transaction.

use super::KeyValueStore;
use crate::CharadexError;
use redb::{Database, ReadableDatabase, ReadableTableMetadata, TableDefinition};
use serde_json::Value;
use std::path::Path;

/// Table for stored values: key string -> JSON text
const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("local_storage");

/// A disk-backed key-value store using redb.
pub struct RedbStorage {
    db: Database,
}

impl std::fmt::Debug for RedbStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStorage").finish_non_exhaustive()
    }
}

impl RedbStorage {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CharadexError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| CharadexError::IoError(e.to_string()))?;

        // Initialize the table so reads never see a missing table
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| CharadexError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(ENTRIES)
                .map_err(|e| CharadexError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| CharadexError::IoError(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<u64, CharadexError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CharadexError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| CharadexError::IoError(e.to_string()))?;
        table
            .len()
            .map_err(|e| CharadexError::IoError(e.to_string()))
    }
}

impl KeyValueStore for RedbStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, CharadexError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| CharadexError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| CharadexError::IoError(e.to_string()))?;
        let Some(raw) = table
            .get(key)
            .map_err(|e| CharadexError::IoError(e.to_string()))?
        else {
            return Ok(None);
        };
        serde_json::from_str(raw.value())
            .map(Some)
            .map_err(|e| CharadexError::DeserializationError(e.to_string()))
    }

    fn set_many(&mut self, entries: &[(&str, Value)]) -> Result<(), CharadexError> {
        // Serialize everything before the transaction opens.
        let encoded = entries
            .iter()
            .map(|(key, value)| {
                serde_json::to_string(value)
                    .map(|text| (*key, text))
                    .map_err(|e| CharadexError::SerializationError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| CharadexError::IoError(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(ENTRIES)
                .map_err(|e| CharadexError::IoError(e.to_string()))?;
            for (key, text) in &encoded {
                table
                    .insert(*key, text.as_str())
                    .map_err(|e| CharadexError::IoError(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| CharadexError::IoError(e.to_string()))
    }
}
