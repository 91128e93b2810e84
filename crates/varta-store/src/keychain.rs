use async_trait::async_trait;
use tracing::warn;

use crate::{KvStore, StoreError};

/// OS-keyring-backed store. Each key maps to one keychain entry under a fixed
/// service name, so credentials never touch plain files.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, key).map_err(|err| StoreError::Backend {
            message: format!("failed to access keyring: {err}"),
        })
    }
}

#[async_trait]
impl KvStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(StoreError::Backend {
                message: format!("failed to load '{key}' from keyring: {err}"),
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| StoreError::Backend {
                message: format!("failed to store '{key}' in keyring: {err}"),
            })
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => {
                warn!(key = %key, "failed to delete keyring entry: {err}");
                Ok(())
            }
        }
    }
}
