// Key-value storage port.
//
// Purpose
// - Describe the persistent storage the tracker mirrors its collections into.
//
// Boundaries
// - Values are opaque JSON text; decoding and tolerance of bad data live in the caller.
// - Every implementation namespaces its keys under a fixed store identifier.

pub mod in_memory;
pub mod json_file;

use async_trait::async_trait;
use thiserror::Error;

pub const STORE_NAMESPACE: &str = "ticket-time-tracker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Tickets,
    TimeBlocks,
    Settings,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Tickets => "tickets_v1",
            StoreKey::TimeBlocks => "events_v1",
            StoreKey::Settings => "settings_v1",
        }
    }
}

#[derive(Debug, Error)]
pub enum KeyValueStoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, KeyValueStoreError>;
    async fn set(&self, key: StoreKey, value: String) -> Result<(), KeyValueStoreError>;
}
