use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use varta_core::{
    decode_expiry, extract_refresh_tokens, RefreshRequest, ACCESS_TOKEN_KEY, REFRESH_PATH,
    REFRESH_SKEW_SECONDS, REFRESH_TOKEN_KEY,
};
use varta_store::KvStore;

use crate::http::ApiClient;
use crate::tokens::TokenResolver;

enum AccessState {
    Fresh,
    Expiring,
    Missing,
}

/// Keeps the stored access credential usable by exchanging the refresh
/// credential before expiry. Sole writer of refreshed credentials.
pub struct SessionManager {
    store: Arc<dyn KvStore>,
    client: ApiClient,
    resolver: TokenResolver,
    refresh_guard: Mutex<()>,
}

impl SessionManager {
    pub fn new(client: ApiClient, store: Arc<dyn KvStore>) -> Self {
        Self {
            resolver: TokenResolver::new(Arc::clone(&store)),
            store,
            client,
            refresh_guard: Mutex::new(()),
        }
    }

    /// `true`: the caller may proceed with a valid access credential.
    /// `false`: the caller must force re-authentication. Refresh failures of
    /// every kind collapse to `false`; this never errors.
    pub async fn ensure_fresh_session(&self) -> bool {
        match self.access_state().await {
            AccessState::Fresh => return true,
            AccessState::Missing => return false,
            AccessState::Expiring => {}
        }

        // Refreshes are serialized; a waiter re-checks the stored credential
        // after acquiring the guard, so concurrent callers collapse to one
        // upstream exchange.
        let _guard = self.refresh_guard.lock().await;
        match self.access_state().await {
            AccessState::Fresh => true,
            AccessState::Missing => false,
            AccessState::Expiring => self.refresh().await,
        }
    }

    async fn access_state(&self) -> AccessState {
        let Some(access) = self.resolver.resolve_access_token().await else {
            debug!("no access credential in storage");
            return AccessState::Missing;
        };
        let exp = match decode_expiry(&access) {
            Ok(exp) => exp,
            Err(err) => {
                // Unparseable token: require re-login rather than guessing.
                warn!("stored access credential is unusable: {err}");
                return AccessState::Missing;
            }
        };
        let remaining = exp - Utc::now().timestamp();
        if remaining > REFRESH_SKEW_SECONDS {
            AccessState::Fresh
        } else {
            debug!(seconds_remaining = remaining, "access credential near expiry");
            AccessState::Expiring
        }
    }

    async fn refresh(&self) -> bool {
        let Some(refresh) = self.resolver.resolve_refresh_token().await else {
            debug!("no refresh credential in storage");
            return false;
        };

        let payload = match serde_json::to_value(RefreshRequest { refresh }) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to encode refresh request: {err}");
                return false;
            }
        };
        let envelope = self.client.post(REFRESH_PATH, Some(payload), false).await;
        if !envelope.success {
            warn!(status = envelope.status_code, "token refresh rejected");
            return false;
        }
        let Some(tokens) = envelope.data.as_ref().and_then(extract_refresh_tokens) else {
            warn!("refresh response carried no access token at any known location");
            return false;
        };

        if let Err(err) = self.store.set(ACCESS_TOKEN_KEY, &tokens.access).await {
            warn!("failed to persist refreshed access credential: {err}");
            return false;
        }
        // Rotation is optional; a missing rotated refresh credential keeps
        // the previous one valid.
        if let Some(rotated) = tokens.refresh.as_deref() {
            if let Err(err) = self.store.set(REFRESH_TOKEN_KEY, rotated).await {
                warn!("failed to persist rotated refresh credential: {err}");
            }
        }
        info!("session refreshed");
        true
    }
}
