//! HTTP request builder

use super::payload::Payload;
use super::retry::RetryPolicy;
use crate::error::{Error, Result, parse_retry_after};
use crate::observability::{RequestMetadata, RequestTimer};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use url::Url;

/// Body attached to a request.
///
/// Every variant can be rebuilt for a retry: bytes are cheaply cloned, forms
/// are re-encoded from the payload and files are reopened.
#[derive(Debug, Clone, Default)]
pub(crate) enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
    Multipart(Payload),
    File { path: PathBuf, len: u64 },
}

impl RequestBody {
    fn size_hint(&self) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::Bytes(bytes) => Some(bytes.len() as u64),
            Self::Multipart(_) => None,
            Self::File { len, .. } => Some(*len),
        }
    }
}

/// Final HTTP exchange, successful or not.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    pub retries_taken: u32,
    pub elapsed: Duration,
}

/// Builder for HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    path: String,
    headers: HeaderMap,
    body: RequestBody,
    retry: RetryPolicy,
    http_client: reqwest::Client,
}

impl RequestBuilder {
    /// Create a new request builder.
    ///
    /// `path` is the logical request path used for logging and error
    /// classification.
    pub(crate) fn new(
        http_client: reqwest::Client,
        method: Method,
        url: Url,
        path: impl Into<String>,
    ) -> Self {
        Self {
            method,
            url,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            retry: RetryPolicy::default(),
            http_client,
        }
    }

    /// Try to set a header, returning an error if the name or value is invalid.
    pub fn try_header(mut self, key: &str, value: &str) -> Result<Self> {
        let name = key
            .parse::<HeaderName>()
            .map_err(|e| Error::HttpClient(format!("Invalid header name '{key}': {e}")))?;
        let value = value
            .parse::<HeaderValue>()
            .map_err(|e| Error::HttpClient(format!("Invalid header value for '{key}': {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub(crate) fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    async fn build_attempt(&self) -> Result<reqwest::RequestBuilder> {
        let mut req = self
            .http_client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());

        req = match &self.body {
            RequestBody::Empty => req,
            RequestBody::Bytes(bytes) => req.body(bytes.clone()),
            RequestBody::Multipart(payload) => req.multipart(payload.to_form()?),
            RequestBody::File { path, .. } => {
                let file = tokio::fs::File::open(path).await?;
                req.body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            }
        };
        Ok(req)
    }

    /// Send the request, retrying per the policy.
    ///
    /// Returns the final response whatever its status; only transport
    /// failures are errors here.
    pub(crate) async fn send(self) -> Result<RawResponse> {
        let timer = RequestTimer::start();
        let mut metadata = RequestMetadata::new(self.method.as_str(), self.path.clone());
        if let Some(size) = self.body.size_hint() {
            metadata = metadata.with_body_size(size);
        }

        let mut attempt = 0;
        loop {
            metadata.log_request(attempt);
            let req = self.build_attempt().await?;

            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(e) => return Err(map_transport_error(e)),
            };

            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = resp.bytes().await.map_err(map_transport_error)?;

            if self
                .retry
                .should_retry(&self.method, status.as_u16(), attempt)
            {
                let delay = self.retry.delay_for(attempt, parse_retry_after(&headers));
                metadata.log_retry(Some(status.as_u16()), attempt + 1, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Ok(RawResponse {
                status,
                headers,
                bytes,
                retries_taken: attempt,
                elapsed: timer.elapsed(),
            });
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else if e.is_builder() {
        Error::HttpClient(e.to_string())
    } else {
        Error::Connection(e.to_string())
    }
}
