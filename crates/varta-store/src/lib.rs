use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

mod file;
mod keychain;
mod memory;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {message}")]
    Backend { message: String },
}

/// Persistent, asynchronous, string-keyed storage device. Durable credential
/// bytes live behind this trait; callers inject an implementation instead of
/// reaching for an ambient global.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `Ok(None)` when the key is absent; `Err` only for backend faults.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Reads a JSON-serialized object stored under `key`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Stores `value` under `key` as JSON.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
