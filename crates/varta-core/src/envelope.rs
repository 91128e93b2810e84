use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized result of every API call. Each transport outcome, success or
/// failure, maps to exactly one envelope; callers branch on `success` and
/// `status_code` instead of catching errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiEnvelope {
    /// Envelope for a 2xx response. `success` and `message` are lifted from
    /// the body when present; the full body is kept in `data`.
    pub fn ok(status_code: u16, body: Value) -> Self {
        let success = body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(String::from);
        Self {
            success,
            data: Some(body),
            message,
            status_code,
            error: None,
        }
    }

    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            status_code,
            error: None,
        }
    }

    pub fn failure_with_data(status_code: u16, message: impl Into<String>, body: Value) -> Self {
        Self {
            data: Some(body),
            ..Self::failure(status_code, message)
        }
    }

    /// Non-JSON body: keep the raw text so it is never lost.
    pub fn from_text(status_code: u16, success: bool, text: impl Into<String>) -> Self {
        Self {
            success,
            data: None,
            message: Some(text.into()),
            status_code,
            error: None,
        }
    }

    /// No usable credential in storage; returned without a network call.
    pub fn login_required() -> Self {
        Self::failure(401, "Please login again.")
    }

    pub fn unauthorized(message: Option<String>) -> Self {
        let message =
            message.unwrap_or_else(|| "Authentication failed. Please login again.".to_string());
        Self::failure(401, message)
    }

    /// Gateway failure, distinct from an application 5xx.
    pub fn upstream_unavailable() -> Self {
        Self::failure(502, "Server is temporarily unavailable. Please try again later.")
    }

    pub fn timed_out() -> Self {
        Self {
            error: Some("Request timeout".to_string()),
            ..Self::failure(0, "Request timed out. Please check your connection and try again.")
        }
    }

    pub fn network_failure(cause: impl std::fmt::Display) -> Self {
        Self {
            error: Some(cause.to_string()),
            ..Self::failure(0, "Network error occurred. Please try again.")
        }
    }
}

/// Most specific human-readable message in an error body, probing `error`,
/// `detail`, then `message`.
pub fn best_message(body: &Value) -> Option<String> {
    ["error", "detail", "message"].iter().find_map(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(String::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_lifts_success_and_message_from_body() {
        let envelope = ApiEnvelope::ok(200, json!({"success": false, "message": "nope"}));
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("nope"));
        assert_eq!(envelope.status_code, 200);
    }

    #[test]
    fn ok_defaults_success_to_true() {
        let envelope = ApiEnvelope::ok(201, json!({"id": 7}));
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!({"id": 7})));
        assert!(envelope.message.is_none());
    }

    #[test]
    fn best_message_prefers_error_over_detail_over_message() {
        let body = json!({"message": "m", "detail": "d", "error": "e"});
        assert_eq!(best_message(&body).as_deref(), Some("e"));
        let body = json!({"message": "m", "detail": "d"});
        assert_eq!(best_message(&body).as_deref(), Some("d"));
        let body = json!({"message": "m"});
        assert_eq!(best_message(&body).as_deref(), Some("m"));
        assert_eq!(best_message(&json!({"other": 1})), None);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let text = serde_json::to_string(&ApiEnvelope::timed_out()).expect("serialize");
        assert!(text.contains("\"statusCode\":0"));
        assert!(text.contains("Request timeout"));
    }
}
