//! HTTP response handling

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON document
    Json(Value),
    /// Non-JSON text
    Text(String),
    /// No body
    Empty,
}

impl ResponseBody {
    /// Decode raw bytes according to the endpoint's content type.
    ///
    /// Bodies that fail to parse as JSON fall back to text.
    pub fn decode(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        if is_json && let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            return Self::Json(value);
        }
        Self::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    /// The JSON document, if this is one.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consume into a JSON value; text becomes a JSON string, empty becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Empty => Value::Null,
        }
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A successful HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    /// Number of retries taken (0 if no retries)
    pub retries_taken: u32,
    /// Time spent on the whole exchange, including retry delays
    pub elapsed: Duration,
}

impl Response {
    /// Create a new response.
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: ResponseBody,
        retries_taken: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            retries_taken,
            elapsed,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Get the decoded body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Consume the response, returning its body.
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Deserialize the JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> crate::error::Result<T> {
        let value = self.body.clone().into_json();
        Ok(serde_json::from_value(value)?)
    }
}

/// Snapshot of the most recent response an endpoint received.
///
/// Recorded for every final response, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct LastResponse {
    /// HTTP status
    pub status: u16,
    /// Request path as sent, with a leading `/`
    pub path: String,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: String,
    /// Retries taken before this response
    pub retries_taken: u32,
    /// Time spent on the whole exchange
    pub elapsed: Duration,
}
