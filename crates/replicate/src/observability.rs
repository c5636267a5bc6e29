//! Structured logging helpers
//!
//! All HTTP exchanges and cache decisions are logged through this layer so the
//! field names stay consistent. Nothing here installs a subscriber.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<u64>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: u64) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log request being sent
    pub fn log_request(&self, attempt: u32) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            attempt,
            "Sending HTTP request"
        );
    }

    /// Log a retry about to happen
    pub fn log_retry(&self, status: Option<u16>, attempt: u32, delay: Duration) {
        warn!(
            method = %self.method,
            path = %self.path,
            status,
            attempt,
            delay_ms = delay.as_millis(),
            "Retrying HTTP request"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Time elapsed for the request, retries included
    pub elapsed: Duration,
    /// Number of retries taken (if any)
    pub retries: u32,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            elapsed,
            retries: 0,
        }
    }

    /// Set the number of retries
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            retries = self.retries,
            "HTTP request succeeded"
        );
    }

    /// Log failed response
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            retries = self.retries,
            "HTTP request failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log a cache hit for `key`.
pub fn log_cache_hit(cache: &str, key: &str) {
    debug!(cache = %cache, key = %key, "Cache hit");
}

/// Log a local validation failure
pub fn log_validation_error(field: &str, reason: &str) {
    debug!(
        field = %field,
        reason = %reason,
        "Request validation failed"
    );
}
