#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use varta_client::ApiClient;
use varta_store::{KvStore, MemoryStore};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("varta_client=debug")
        .with_target(false)
        .try_init();
}

/// Compact JWT with the given expiry; signed with a junk signature, which is
/// all the advisory expiry check ever looks at.
pub fn make_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"user_id":7,"role":"reader"}}"#));
    format!("{header}.{payload}.signature")
}

pub fn client_with_store(base_url: &str) -> (ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = ApiClient::new(base_url, Arc::clone(&store) as Arc<dyn KvStore>)
        .expect("client")
        .with_timeout(Duration::from_secs(5));
    (client, store)
}
