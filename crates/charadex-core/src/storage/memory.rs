use super::KeyValueStore;
use crate::CharadexError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Volatile key-value map. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Value>,
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, CharadexError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, Value)]) -> Result<(), CharadexError> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
