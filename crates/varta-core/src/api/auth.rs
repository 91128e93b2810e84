use serde::Serialize;
use serde_json::Value;

/// Body of the refresh exchange. The refresh credential is the payload, not a
/// bearer header.
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access: String,
    pub refresh: Option<String>,
}

// The backend's refresh response shape has drifted across deployments; these
// are every location a token has been observed at, in priority order.
const ACCESS_PATHS: [&str; 4] = ["data.access", "access", "token", "data.token"];
const REFRESH_PATHS: [&str; 6] = [
    "data.refresh",
    "refresh",
    "refreshToken",
    "data.refreshToken",
    "refresh_token",
    "data.refresh_token",
];

fn lookup_path<'a>(body: &'a Value, path: &str) -> Option<&'a str> {
    let mut current = body;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    current.as_str().filter(|token| !token.is_empty())
}

/// Resolves a refresh-endpoint response body into the new token pair. Returns
/// `None` when no access token is present at any known location; a rotated
/// refresh token is optional.
pub fn extract_refresh_tokens(body: &Value) -> Option<RefreshedTokens> {
    let access = ACCESS_PATHS
        .iter()
        .find_map(|path| lookup_path(body, path))?;
    let refresh = REFRESH_PATHS
        .iter()
        .find_map(|path| lookup_path(body, path));
    Some(RefreshedTokens {
        access: access.to_string(),
        refresh: refresh.map(str::to_string),
    })
}
