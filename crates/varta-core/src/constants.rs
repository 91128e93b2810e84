/// Canonical storage key for the access credential, stored as a raw string.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Legacy key an older write path used for the access credential.
pub const LEGACY_ACCESS_TOKEN_KEY: &str = "token";

/// Canonical storage key for the refresh credential, stored as a raw string.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Legacy key an older write path used for the refresh credential.
pub const LEGACY_REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Field name of the object wrapper older write paths stored tokens under.
pub const WRAPPED_TOKEN_FIELD: &str = "data";

/// Access tokens within this many seconds of expiry are refreshed proactively.
pub const REFRESH_SKEW_SECONDS: i64 = 600;

pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;

/// Refresh exchange endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "token/refresh/";
