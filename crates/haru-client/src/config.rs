use std::time::Duration;

use haru_core::{DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_MS, DEFAULT_REFRESH_PATH};
use reqwest::Url;

pub const BASE_URL_ENV: &str = "HARU_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "HARU_API_TIMEOUT_MS";
pub const REFRESH_PATH_ENV: &str = "HARU_REFRESH_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("refusing to use http:// without allow_insecure: {0}")]
    InsecureBaseUrl(String),
    #[error("invalid timeout '{0}': expected milliseconds")]
    InvalidTimeout(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub refresh_path: String,
    pub user_agent: String,
    pub allow_insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base url is valid"),
            timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            user_agent: concat!("haru/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_insecure: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Defaults overridden by `HARU_API_BASE_URL`, `HARU_API_TIMEOUT_MS` and
    /// `HARU_REFRESH_PATH` when they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.base_url = parse_base_url(&url)?;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_millis(millis);
        }
        if let Ok(path) = std::env::var(REFRESH_PATH_ENV) {
            config.refresh_path = path;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    #[must_use]
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    pub(crate) fn ensure_secure(&self) -> Result<(), ConfigError> {
        if self.base_url.scheme() == "http" && !self.allow_insecure {
            return Err(ConfigError::InsecureBaseUrl(self.base_url.to_string()));
        }
        Ok(())
    }

    /// Joins a request path onto the base URL, keeping any path prefix the
    /// base URL already carries.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ClientConfig::new("https://api.example.com/").expect("config");
        assert_eq!(
            config.endpoint("/v1/streaks"),
            "https://api.example.com/v1/streaks"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let config = ClientConfig::new("https://example.com/api").expect("config");
        assert_eq!(
            config.endpoint("auth/refresh"),
            "https://example.com/api/auth/refresh"
        );
    }

    #[test]
    fn http_requires_opt_in() {
        let config = ClientConfig::new("http://127.0.0.1:1234").expect("config");
        assert!(config.ensure_secure().is_err());
        assert!(config.allow_insecure(true).ensure_secure().is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn defaults_match_backend_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.refresh_path, "/auth/refresh");
        assert_eq!(config.base_url.scheme(), "https");
    }
}
