//! In-memory settings storage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::SettingsStorage;
use crate::error::SettingsResult;

/// Settings storage held in process memory.
///
/// Nothing is persisted; used for tests and for dry runs.
#[derive(Debug, Default)]
pub struct MemorySettingsStorage {
    values: RwLock<BTreeMap<String, Value>>,
}

impl MemorySettingsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the given key/value pairs.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[async_trait]
impl SettingsStorage for MemorySettingsStorage {
    async fn load(&self, key: &str) -> SettingsResult<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> SettingsResult<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SettingsResult<bool> {
        Ok(self.values.write().remove(key).is_some())
    }
}
