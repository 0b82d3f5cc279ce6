/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api-staging.haruharu.online";

/// Per-request timeout applied to every call, refresh included.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

pub const ACCESS_TOKEN_KEY: &str = "haruharu_access_token";
pub const REFRESH_TOKEN_KEY: &str = "haruharu_refresh_token";

pub mod messages {
    pub const NETWORK_ERROR: &str = "Please check your network connection";
    pub const SERVER_ERROR: &str = "A server error occurred";
    pub const UNAUTHORIZED: &str = "Login is required";
    pub const FORBIDDEN: &str = "You do not have permission";
    pub const NOT_FOUND: &str = "The requested data could not be found";
    pub const VALIDATION_ERROR: &str = "Please check the values you entered";
    pub const DECODE_ERROR: &str = "The server sent an unexpected response";
    pub const STORAGE_ERROR: &str = "Stored credentials could not be accessed";
}
