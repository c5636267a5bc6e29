//! HTTP transport
//!
//! This module provides the HTTP layer for the client: endpoints, the retry
//! loop, request payloads and response decoding.

pub use endpoint::{Endpoint, EndpointBuilder, JSON_CONTENT_TYPE, validate_path};
pub use payload::{FilePart, Payload};
pub use request::RequestBuilder;
pub use response::{LastResponse, Response, ResponseBody};
pub use retry::{DEFAULT_RETRY_STATUSES, RetryPolicy, RetryPolicyBuilder};

mod endpoint;
mod payload;
mod request;
mod response;
mod retry;

// Re-export HTTP types from the http crate for convenience
pub use http::{HeaderMap, Method, StatusCode};
