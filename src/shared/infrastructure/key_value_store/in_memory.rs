// In memory implementation of the KeyValueStore port.
//
// Purpose
// - Support store and persistence tests, and the `memory` storage mode, without touching disk.

use crate::shared::infrastructure::key_value_store::{KeyValueStore, KeyValueStoreError, StoreKey};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    namespace: String,
    entries: RwLock<HashMap<String, String>>,
    is_offline: bool,
}

impl InMemoryKeyValueStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    fn scoped(&self, key: StoreKey) -> String {
        format!("{}/{}", self.namespace, key.as_str())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, KeyValueStoreError> {
        if self.is_offline {
            return Err(KeyValueStoreError::Backend("Key-value store offline".into()));
        }
        Ok(self.entries.read().await.get(&self.scoped(key)).cloned())
    }

    async fn set(&self, key: StoreKey, value: String) -> Result<(), KeyValueStoreError> {
        if self.is_offline {
            return Err(KeyValueStoreError::Backend("Key-value store offline".into()));
        }
        self.entries.write().await.insert(self.scoped(key), value);
        Ok(())
    }
}
