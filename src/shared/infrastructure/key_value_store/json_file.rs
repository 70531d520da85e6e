// JSON file implementation of the KeyValueStore port.
//
// Layout: `<data_dir>/<namespace>/<key>.json`, one document per key.
// Writes go through a temporary file and a rename so a crash never leaves a
// half-written document behind.

use crate::shared::infrastructure::key_value_store::{KeyValueStore, KeyValueStoreError, StoreKey};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct JsonFileKeyValueStore {
    root: PathBuf,
}

impl JsonFileKeyValueStore {
    /// Creates the namespace directory if it does not exist yet.
    pub async fn open(data_dir: impl AsRef<Path>, namespace: &str) -> Result<Self, KeyValueStoreError> {
        let root = data_dir.as_ref().join(namespace);
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(path = %root.display(), "json file store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.root.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, KeyValueStoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn set(&self, key: StoreKey, value: String) -> Result<(), KeyValueStoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
