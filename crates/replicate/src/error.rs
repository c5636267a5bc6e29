//! Error types for the Replicate client
//!
//! Every failure that crosses a module boundary is one variant of [`Error`].
//! Validation and configuration errors are raised before any network call;
//! the HTTP-derived variants are produced by [`Error::from_response`] after the
//! transport has exhausted its retries.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a Replicate client error.
pub type Result<T> = std::result::Result<T, Error>;

/// Which resource a 404 response refers to.
///
/// Derived from the path of the request that produced the 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundKind {
    /// `/models/{owner}/{name}`
    Model,
    /// `/models/{owner}/{name}/versions/{id}`
    Version,
    /// `/predictions/{id}`
    Prediction,
    /// `/trainings/{id}`
    Training,
    /// Any other path
    Generic,
}

impl NotFoundKind {
    /// Classify a request path.
    ///
    /// `/versions/` is checked before `/models/` because version paths are
    /// nested under their model.
    pub fn from_path(path: &str) -> Self {
        if path.contains("/versions/") {
            Self::Version
        } else if path.contains("/models/") {
            Self::Model
        } else if path.contains("/predictions/") {
            Self::Prediction
        } else if path.contains("/trainings/") {
            Self::Training
        } else {
            Self::Generic
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Model => "Model not found",
            Self::Version => "Model version not found",
            Self::Prediction => "Prediction not found",
            Self::Training => "Training not found",
            Self::Generic => "Not found",
        }
    }
}

/// Fieldless discriminant of [`Error`], convenient for retry/abort decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input, raised before any request.
    Validation,
    /// Missing or invalid client configuration.
    Configuration,
    /// 401 from the API.
    Authentication,
    /// 404 from the API.
    NotFound(NotFoundKind),
    /// 429 from the API.
    RateLimit,
    /// Client-side timeout.
    Timeout,
    /// Network failure before a response arrived.
    Connection,
    /// Any other unsuccessful API response.
    Api,
    /// Dataset upload failure.
    Upload,
    /// A model record is missing data needed for a follow-up call.
    Model,
    /// Dynamic record attribute lookup failed.
    Attribute,
    /// JSON encoding or decoding failed.
    Serialization,
    /// Local I/O failure.
    Io,
    /// The underlying HTTP client could not be built.
    HttpClient,
}

/// Main error type for the Replicate client.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input failed a local check.
    #[error("{0}")]
    Validation(String),

    /// Client configuration is missing or invalid.
    #[error("{message}{}", suggestion_suffix(.suggestion))]
    Configuration {
        /// What is wrong
        message: String,
        /// How to fix it, if known
        suggestion: Option<String>,
    },

    /// The API rejected the credentials (401).
    #[error("{message}")]
    Authentication {
        /// Human readable message
        message: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The requested resource does not exist (404).
    #[error("{message}")]
    NotFound {
        /// Which kind of resource was missing
        resource: NotFoundKind,
        /// Human readable message
        message: String,
        /// Raw response body
        body: String,
    },

    /// Too many requests (429).
    #[error("{message}")]
    RateLimit {
        /// Human readable message
        message: String,
        /// Raw response body
        body: String,
        /// Value of the `Retry-After` header, if the API sent one
        retry_after: Option<Duration>,
    },

    /// The request did not complete within its time budget.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The request could not reach the server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Any other unsuccessful API response.
    #[error("{message}")]
    Api {
        /// Human readable message
        message: String,
        /// HTTP status code, when the error came from a response
        status: Option<u16>,
        /// Raw response body, when the error came from a response
        body: Option<String>,
    },

    /// Uploading a dataset to its storage target failed.
    #[error("{message}")]
    Upload {
        /// Human readable message
        message: String,
        /// HTTP status code of the storage response, if any
        status: Option<u16>,
        /// Raw storage response body, if any
        body: Option<String>,
    },

    /// A model record lacks data required for the requested operation.
    #[error("{0}")]
    Model(String),

    /// A record has no attribute with the requested name.
    #[error("undefined attribute `{name}` for {record}")]
    NoSuchAttribute {
        /// Record variant name
        record: &'static str,
        /// Requested attribute
        name: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!("\nSuggestion: {s}"))
        .unwrap_or_default()
}

impl Error {
    /// Classify an unsuccessful HTTP response.
    ///
    /// `path` is the request path of the same call and drives the 404
    /// sub-classification. Must not be called with a 2xx status.
    pub fn from_response(status: u16, body: &str, headers: &http::HeaderMap, path: &str) -> Self {
        match status {
            400 => Error::Api {
                message: format!("Bad request (400): {}", parse_error_message(body)),
                status: Some(status),
                body: Some(body.to_string()),
            },
            422 => Error::Api {
                message: format!("Unprocessable entity (422): {}", parse_error_message(body)),
                status: Some(status),
                body: Some(body.to_string()),
            },
            401 => Error::Authentication {
                message: "Unauthorized (401): Check your API token".to_string(),
                status,
                body: body.to_string(),
            },
            403 => Error::Api {
                message: "Forbidden (403): Insufficient permissions".to_string(),
                status: Some(status),
                body: Some(body.to_string()),
            },
            429 => Error::RateLimit {
                message: "Rate limited (429): Too many requests".to_string(),
                body: body.to_string(),
                retry_after: parse_retry_after(headers),
            },
            404 => {
                let resource = NotFoundKind::from_path(path);
                Error::NotFound {
                    resource,
                    message: format!("{} (404): {}", resource.label(), parse_error_message(body)),
                    body: body.to_string(),
                }
            }
            500..=599 => Error::Api {
                message: format!("Server error ({status}): {}", parse_error_message(body)),
                status: Some(status),
                body: Some(body.to_string()),
            },
            _ => Error::Api {
                message: format!("Unexpected response ({status}): {body}"),
                status: Some(status),
                body: Some(body.to_string()),
            },
        }
    }

    /// Build a configuration error with a remediation hint.
    pub fn configuration(message: impl Into<String>, suggestion: Option<&str>) -> Self {
        Error::Configuration {
            message: message.into(),
            suggestion: suggestion.map(String::from),
        }
    }

    /// The fieldless kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::NotFound { resource, .. } => ErrorKind::NotFound(*resource),
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Api { .. } => ErrorKind::Api,
            Error::Upload { .. } => ErrorKind::Upload,
            Error::Model(_) => ErrorKind::Model,
            Error::NoSuchAttribute { .. } => ErrorKind::Attribute,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Io(_) => ErrorKind::Io,
            Error::HttpClient(_) => ErrorKind::HttpClient,
        }
    }

    /// HTTP status code of the response that caused this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(404),
            Error::RateLimit { .. } => Some(429),
            Error::Api { status, .. } | Error::Upload { status, .. } => *status,
            _ => None,
        }
    }

    /// Raw response body of the response that caused this error, if any.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Error::Authentication { body, .. }
            | Error::NotFound { body, .. }
            | Error::RateLimit { body, .. } => Some(body),
            Error::Api { body, .. } | Error::Upload { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Which resource was missing, for 404 errors.
    pub fn not_found_kind(&self) -> Option<NotFoundKind> {
        match self {
            Error::NotFound { resource, .. } => Some(*resource),
            _ => None,
        }
    }

    /// Whether a caller-level retry of the same call could plausibly succeed.
    ///
    /// The transport has already retried retryable statuses by the time an
    /// error surfaces; this only informs higher-level loops.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimit { .. } | Error::Connection(_) => true,
            Error::Api {
                status: Some(status),
                ..
            } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Extract the `detail` field from an error body, falling back to the raw text.
pub(crate) fn parse_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(serde_json::Value::Null) | None => body.to_string(),
            Some(other) => other.to_string(),
        },
        _ => body.to_string(),
    }
}

/// Parse a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &http::HeaderMap) -> Option<Duration> {
    headers
        .get(http::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
