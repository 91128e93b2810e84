use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};

/// Failures while inspecting a compact JWT. All of these mean "cannot confirm
/// the token is still valid"; callers treat them as a re-login signal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("token is not a three-segment JWT")]
    MalformedToken,
    #[error("token payload is not base64url-encoded JSON")]
    MalformedPayload,
    #[error("token payload carries no usable exp claim")]
    MissingExpiryClaim,
}

/// Unverified claims from a JWT payload. Only `exp` is interpreted; the rest
/// ride along opaquely.
#[derive(Debug, Clone)]
pub struct Claims {
    pub exp: i64,
    pub extra: Map<String, Value>,
}

/// Decodes the payload segment of a compact JWT without verifying the
/// signature. This is a refresh-timing heuristic only and must never back an
/// authorization decision.
pub fn decode_claims(token: &str) -> Result<Claims, JwtError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(JwtError::MalformedToken);
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| JwtError::MalformedPayload)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|_| JwtError::MalformedPayload)?;
    let Value::Object(mut claims) = value else {
        return Err(JwtError::MalformedPayload);
    };

    let exp = claims
        .remove("exp")
        .and_then(|value| value.as_i64())
        .ok_or(JwtError::MissingExpiryClaim)?;
    Ok(Claims { exp, extra: claims })
}

/// Expiry claim of a compact JWT, in Unix epoch seconds.
pub fn decode_expiry(token: &str) -> Result<i64, JwtError> {
    decode_claims(token).map(|claims| claims.exp)
}
