//! Session and API client core: token resolution over the device store,
//! proactive JWT refresh, and an HTTP client that normalizes every transport
//! outcome into one response envelope.

pub mod http;
pub mod session;
pub mod tokens;

pub use crate::http::ApiClient;
pub use crate::session::SessionManager;
pub use crate::tokens::{clear_session, store_session, TokenLookup, TokenResolver};
pub use varta_core::ApiEnvelope;
