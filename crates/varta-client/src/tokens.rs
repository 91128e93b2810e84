use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use varta_core::{
    ACCESS_TOKEN_KEY, LEGACY_ACCESS_TOKEN_KEY, LEGACY_REFRESH_TOKEN_KEY, REFRESH_TOKEN_KEY,
    WRAPPED_TOKEN_FIELD,
};
use varta_store::{KvStore, StoreError};

/// One way a credential may be laid out in storage. Historical write paths
/// left tokens behind in several shapes; reads probe them in order.
#[derive(Debug, Clone)]
pub enum TokenLookup {
    /// Object wrapper `{"<field>": "<token>"}` under `key`.
    WrappedObject {
        key: &'static str,
        field: &'static str,
    },
    /// Raw token string under `key`.
    RawString { key: &'static str },
}

impl TokenLookup {
    fn key(&self) -> &'static str {
        match self {
            Self::WrappedObject { key, .. } | Self::RawString { key } => key,
        }
    }
}

/// Resolves the current bearer credentials from the device store. Read-only;
/// storage faults and malformed wrappers count as "not found".
#[derive(Clone)]
pub struct TokenResolver {
    store: Arc<dyn KvStore>,
    access_lookups: Vec<TokenLookup>,
    refresh_lookups: Vec<TokenLookup>,
}

impl TokenResolver {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            access_lookups: vec![
                TokenLookup::WrappedObject {
                    key: ACCESS_TOKEN_KEY,
                    field: WRAPPED_TOKEN_FIELD,
                },
                TokenLookup::RawString {
                    key: ACCESS_TOKEN_KEY,
                },
                TokenLookup::RawString {
                    key: LEGACY_ACCESS_TOKEN_KEY,
                },
            ],
            refresh_lookups: vec![
                TokenLookup::WrappedObject {
                    key: REFRESH_TOKEN_KEY,
                    field: WRAPPED_TOKEN_FIELD,
                },
                TokenLookup::RawString {
                    key: REFRESH_TOKEN_KEY,
                },
                TokenLookup::RawString {
                    key: LEGACY_REFRESH_TOKEN_KEY,
                },
            ],
        }
    }

    pub async fn resolve_access_token(&self) -> Option<String> {
        self.resolve(&self.access_lookups).await
    }

    pub async fn resolve_refresh_token(&self) -> Option<String> {
        self.resolve(&self.refresh_lookups).await
    }

    async fn resolve(&self, lookups: &[TokenLookup]) -> Option<String> {
        for lookup in lookups {
            match self.try_lookup(lookup).await {
                Ok(Some(token)) => return Some(token),
                Ok(None) => {}
                Err(err) => {
                    debug!(key = lookup.key(), "storage fault during token lookup: {err}");
                }
            }
        }
        None
    }

    async fn try_lookup(&self, lookup: &TokenLookup) -> Result<Option<String>, StoreError> {
        let Some(raw) = self.store.get(lookup.key()).await? else {
            return Ok(None);
        };
        let token = match lookup {
            TokenLookup::WrappedObject { field, .. } => serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|value| value.get(*field).and_then(Value::as_str).map(String::from)),
            TokenLookup::RawString { .. } => Some(raw),
        };
        Ok(token.filter(|token| !token.trim().is_empty()))
    }
}

/// Persists a freshly authenticated token pair under the canonical keys.
pub async fn store_session(
    store: &dyn KvStore,
    access: &str,
    refresh: Option<&str>,
) -> Result<(), StoreError> {
    store.set(ACCESS_TOKEN_KEY, access).await?;
    if let Some(refresh) = refresh {
        store.set(REFRESH_TOKEN_KEY, refresh).await?;
    }
    Ok(())
}

/// Deletes every credential key, legacy generations included. Logout path.
pub async fn clear_session(store: &dyn KvStore) -> Result<(), StoreError> {
    for key in [
        ACCESS_TOKEN_KEY,
        LEGACY_ACCESS_TOKEN_KEY,
        REFRESH_TOKEN_KEY,
        LEGACY_REFRESH_TOKEN_KEY,
    ] {
        store.delete(key).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use varta_store::MemoryStore;

    struct FaultyStore;

    #[async_trait]
    impl KvStore for FaultyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend {
                message: format!("device unavailable reading {key}"),
            })
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend {
                message: "device unavailable".to_string(),
            })
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn wrapped_object_wins_over_raw_string() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(ACCESS_TOKEN_KEY, r#"{"data":"wrapped-token"}"#)
            .await
            .expect("set");
        let resolver = TokenResolver::new(store);
        assert_eq!(
            resolver.resolve_access_token().await.as_deref(),
            Some("wrapped-token")
        );
    }

    #[tokio::test]
    async fn raw_string_under_canonical_key() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(ACCESS_TOKEN_KEY, "raw-token")
            .await
            .expect("set");
        let resolver = TokenResolver::new(store);
        assert_eq!(
            resolver.resolve_access_token().await.as_deref(),
            Some("raw-token")
        );
    }

    #[tokio::test]
    async fn falls_back_to_legacy_key() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(LEGACY_ACCESS_TOKEN_KEY, "legacy-token")
            .await
            .expect("set");
        let resolver = TokenResolver::new(Arc::clone(&store) as Arc<dyn KvStore>);
        assert_eq!(
            resolver.resolve_access_token().await.as_deref(),
            Some("legacy-token")
        );

        store
            .set(REFRESH_TOKEN_KEY, r#"{"data":"r1"}"#)
            .await
            .expect("set");
        assert_eq!(resolver.resolve_refresh_token().await.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn empty_and_malformed_values_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "   ").await.expect("set");
        store
            .set(LEGACY_ACCESS_TOKEN_KEY, "usable")
            .await
            .expect("set");
        let resolver = TokenResolver::new(store);
        assert_eq!(
            resolver.resolve_access_token().await.as_deref(),
            Some("usable")
        );
    }

    #[tokio::test]
    async fn storage_faults_resolve_to_none() {
        let resolver = TokenResolver::new(Arc::new(FaultyStore));
        assert_eq!(resolver.resolve_access_token().await, None);
        assert_eq!(resolver.resolve_refresh_token().await, None);
    }

    #[tokio::test]
    async fn session_write_and_clear() {
        let store = MemoryStore::new();
        store
            .set(LEGACY_ACCESS_TOKEN_KEY, "old")
            .await
            .expect("set");
        store_session(&store, "a1", Some("r1")).await.expect("store");
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).await.expect("get").as_deref(),
            Some("a1")
        );
        assert_eq!(
            store.get(REFRESH_TOKEN_KEY).await.expect("get").as_deref(),
            Some("r1")
        );

        clear_session(&store).await.expect("clear");
        for key in [
            ACCESS_TOKEN_KEY,
            LEGACY_ACCESS_TOKEN_KEY,
            REFRESH_TOKEN_KEY,
            LEGACY_REFRESH_TOKEN_KEY,
        ] {
            assert_eq!(store.get(key).await.expect("get"), None);
        }
    }
}
