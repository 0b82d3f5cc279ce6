use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// 400: the caller should show field-level feedback.
    Validation,
    /// 401 that could not be recovered by a refresh.
    Unauthorized,
    Forbidden,
    NotFound,
    /// Any 5xx.
    Server,
    /// Timeouts, DNS and connect failures, and every status not listed above.
    Network,
    /// A successful response whose body did not match the expected shape.
    Decode,
    /// The token store failed outside of the refresh path.
    Storage,
}

impl ErrorKind {
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500..=599 => Self::Server,
            _ => Self::Network,
        }
    }

    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Validation => messages::VALIDATION_ERROR,
            Self::Unauthorized => messages::UNAUTHORIZED,
            Self::Forbidden => messages::FORBIDDEN,
            Self::NotFound => messages::NOT_FOUND,
            Self::Server => messages::SERVER_ERROR,
            Self::Network => messages::NETWORK_ERROR,
            Self::Decode => messages::DECODE_ERROR,
            Self::Storage => messages::STORAGE_ERROR,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not-found",
            Self::Server => "server-error",
            Self::Network => "network-error",
            Self::Decode => "decode-error",
            Self::Storage => "storage-error",
        }
    }

    /// Whether offering the user a manual retry makes sense.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Server | Self::Network)
    }
}

/// Normalized failure surfaced to every caller of the HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(skip)]
    pub kind: ErrorKind,
    #[serde(skip)]
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            status: None,
            message: kind.default_message().to_string(),
            code: None,
            details: None,
        }
    }

    /// Builds the error for a non-2xx response. The backend's own message,
    /// code and details win over the status-derived defaults.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let kind = ErrorKind::from_status(status);
        let parsed = ErrorBody::parse(body);
        Self {
            kind,
            status: Some(status),
            message: parsed
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| kind.default_message().to_string()),
            code: parsed.code,
            details: parsed.details,
        }
    }

    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network).with_details(Value::String(detail.into()))
    }

    #[must_use]
    pub fn decode(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode).with_details(Value::String(detail.into()))
    }

    #[must_use]
    pub fn storage(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage).with_details(Value::String(detail.into()))
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

/// Either of the two error shapes the backend emits:
/// `{ result, data, error: { code, message, data } }` or a flat
/// `{ message, code, details }`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<NestedError>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct NestedError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

struct ParsedError {
    message: Option<String>,
    code: Option<String>,
    details: Option<Value>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> ParsedError {
        let body: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let nested = body.error.unwrap_or_default();
        ParsedError {
            message: nested.message.or(body.message),
            code: nested.code.or(body.code),
            details: nested
                .data
                .filter(|value| !value.is_null())
                .or(body.details.filter(|value| !value.is_null())),
        }
    }
}
