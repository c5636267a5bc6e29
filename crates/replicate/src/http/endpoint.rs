//! A configured API target
//!
//! An [`Endpoint`] owns one base URL, an optional token and a pooled
//! `reqwest` client. It validates paths, issues requests through the retry
//! loop in [`RequestBuilder`] and turns the final response into either a
//! decoded body or a classified [`Error`].

use super::payload::Payload;
use super::request::{RawResponse, RequestBody, RequestBuilder};
use super::response::{LastResponse, Response, ResponseBody};
use super::retry::RetryPolicy;
use crate::config::{ConnectionPoolConfig, Timeouts, default_user_agent};
use crate::error::{Error, Result};
use crate::observability::{RequestMetadata, ResponseMetadata};
use crate::upload::ZipFile;
use bytes::Bytes;
use http::Method;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Default request content type.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One configured base URL plus credentials.
#[derive(Debug)]
pub struct Endpoint {
    base_url: Option<Url>,
    api_token: Option<SecretString>,
    content_type: String,
    http_client: reqwest::Client,
    retry: RetryPolicy,
    last_request_path: Mutex<Option<String>>,
    last_response: Mutex<Option<LastResponse>>,
}

impl Endpoint {
    /// Create a new builder for configuring an endpoint.
    pub fn builder() -> EndpointBuilder {
        EndpointBuilder::default()
    }

    /// Base URL, `None` for token-less one-off targets.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Request content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Whether requests carry an `Authorization` header.
    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Path of the most recent request, with a leading `/`.
    pub fn last_request_path(&self) -> Option<String> {
        self.last_request_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the most recent final response.
    pub fn last_response(&self) -> Option<LastResponse> {
        self.last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> Result<ResponseBody> {
        self.get_with_query(path, &[]).await
    }

    /// GET `path` with query parameters.
    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<ResponseBody> {
        self.request(Method::GET, path, query, RequestBody::Empty).await
    }

    /// POST `payload` to `path`.
    pub async fn post(&self, path: &str, payload: Payload) -> Result<ResponseBody> {
        let body = self.encode(payload)?;
        self.request(Method::POST, path, &[], body).await
    }

    /// PUT `payload` to `path`.
    pub async fn put(&self, path: &str, payload: Payload) -> Result<ResponseBody> {
        let body = self.encode(payload)?;
        self.request(Method::PUT, path, &[], body).await
    }

    /// PATCH `path` with `payload`.
    pub async fn patch(&self, path: &str, payload: Payload) -> Result<ResponseBody> {
        let body = self.encode(payload)?;
        self.request(Method::PATCH, path, &[], body).await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str) -> Result<ResponseBody> {
        self.request(Method::DELETE, path, &[], RequestBody::Empty)
            .await
    }

    /// HEAD `path`.
    pub async fn head(&self, path: &str) -> Result<ResponseBody> {
        self.request(Method::HEAD, path, &[], RequestBody::Empty)
            .await
    }

    /// Stream a zip archive to the base URL with PUT.
    ///
    /// The final response is returned whatever its status so the caller can
    /// report storage failures in its own terms.
    pub async fn put_file(&self, file: &ZipFile) -> Result<Response> {
        let url = self.url_for("", &[])?;
        self.record_path("");
        let raw = self
            .request_builder(Method::PUT, url, "/")?
            .try_header("content-type", "application/zip")?
            .try_header("content-length", &file.len.to_string())?
            .body(RequestBody::File {
                path: file.path.clone(),
                len: file.len,
            })
            .send()
            .await?;

        let body_text = self.record_response("/", &raw);
        self.log_outcome(&Method::PUT, "/", &raw, raw.status.is_success(), &body_text);
        Ok(Response::new(
            raw.status,
            raw.headers.clone(),
            ResponseBody::decode(Some(&self.content_type), &raw.bytes),
            raw.retries_taken,
            raw.elapsed,
        ))
    }

    fn encode(&self, payload: Payload) -> Result<RequestBody> {
        if payload.is_multipart() {
            Ok(RequestBody::Multipart(payload))
        } else {
            Ok(RequestBody::Bytes(Bytes::from(payload.to_json_bytes()?)))
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> Result<ResponseBody> {
        validate_path(path)?;
        let url = self.url_for(path, query)?;
        let logical_path = self.record_path(path);

        let is_multipart = matches!(body, RequestBody::Multipart(_));
        let mut builder = self.request_builder(method.clone(), url, &logical_path)?;
        if !is_multipart {
            builder = builder.try_header("content-type", &self.content_type)?;
        }
        let raw = builder.body(body).send().await?;

        let body_text = self.record_response(&logical_path, &raw);
        let success = raw.status.is_success();
        self.log_outcome(&method, &logical_path, &raw, success, &body_text);

        if success {
            Ok(ResponseBody::decode(Some(&self.content_type), &raw.bytes))
        } else {
            Err(Error::from_response(
                raw.status.as_u16(),
                &body_text,
                &raw.headers,
                &logical_path,
            ))
        }
    }

    fn request_builder(&self, method: Method, url: Url, path: &str) -> Result<RequestBuilder> {
        let mut builder = RequestBuilder::new(self.http_client.clone(), method, url, path)
            .retry(self.retry.clone())
            .try_header("accept", JSON_CONTENT_TYPE)?;
        if let Some(token) = &self.api_token {
            builder =
                builder.try_header("authorization", &format!("Token {}", token.expose_secret()))?;
        }
        Ok(builder)
    }

    /// Join `path` onto the base URL.
    ///
    /// An empty path addresses the base URL itself.
    fn url_for(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let base = self.base_url.as_ref().ok_or_else(|| {
            Error::configuration(
                "Endpoint has no base URL",
                Some("Configure an API base URL for this endpoint"),
            )
        })?;

        let trimmed = path.trim_start_matches('/');
        let joined = if trimmed.is_empty() {
            base.as_str().to_string()
        } else {
            format!("{}/{}", base.as_str().trim_end_matches('/'), trimmed)
        };
        let mut url = Url::parse(&joined)
            .map_err(|e| Error::Validation(format!("Invalid request URL '{joined}': {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        Ok(url)
    }

    fn record_path(&self, path: &str) -> String {
        let logical = format!("/{}", path.trim_start_matches('/'));
        *self
            .last_request_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(logical.clone());
        logical
    }

    fn record_response(&self, path: &str, raw: &RawResponse) -> String {
        let body = String::from_utf8_lossy(&raw.bytes).into_owned();
        *self
            .last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(LastResponse {
            status: raw.status.as_u16(),
            path: path.to_string(),
            headers: raw.headers.clone(),
            body: body.clone(),
            retries_taken: raw.retries_taken,
            elapsed: raw.elapsed,
        });
        body
    }

    fn log_outcome(&self, method: &Method, path: &str, raw: &RawResponse, success: bool, body: &str) {
        let request = RequestMetadata::new(method.as_str(), path);
        let response =
            ResponseMetadata::new(raw.status.as_u16(), raw.elapsed).with_retries(raw.retries_taken);
        if success {
            response.log_success(&request);
        } else {
            response.log_error(&request, body);
        }
    }
}

/// Reject paths that could escape the base URL or need escaping.
///
/// Only ASCII alphanumerics, `_`, `-`, `.` and `/` are accepted; `..` and `\`
/// are rejected outright.
pub fn validate_path(path: &str) -> Result<()> {
    if path.contains("..") || path.contains('\\') {
        return Err(Error::Validation(
            "URL contains invalid path characters".to_string(),
        ));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/');
    if !path.chars().all(allowed) {
        return Err(Error::Validation("URL contains invalid characters".to_string()));
    }
    Ok(())
}

/// Builder for creating an [`Endpoint`] with custom configuration.
#[derive(Debug, Default)]
pub struct EndpointBuilder {
    base_url: Option<String>,
    api_token: Option<SecretString>,
    content_type: Option<String>,
    timeouts: Timeouts,
    retry: RetryPolicy,
    connection_pool: ConnectionPoolConfig,
    user_agent: Option<String>,
}

impl EndpointBuilder {
    /// Set the base URL. Blank strings mean "no base URL".
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API token.
    pub fn api_token(mut self, api_token: Option<SecretString>) -> Self {
        self.api_token = api_token;
        self
    }

    /// Set the request content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the per-attempt timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set connection pool configuration.
    pub fn connection_pool(mut self, pool: ConnectionPoolConfig) -> Self {
        self.connection_pool = pool;
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL is not an absolute URL
    /// with a host, and [`Error::HttpClient`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<Endpoint> {
        let base_url = match self.base_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_base_url(raw)?),
        };

        let user_agent = self.user_agent.unwrap_or_else(default_user_agent);
        let mut http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeouts.total)
            .connect_timeout(self.timeouts.connect)
            .read_timeout(self.timeouts.read)
            .pool_max_idle_per_host(self.connection_pool.max_idle_per_host)
            .pool_idle_timeout(self.connection_pool.idle_timeout);
        if let Some(keepalive) = self.connection_pool.tcp_keepalive {
            http = http.tcp_keepalive(keepalive);
        }
        let http_client = http
            .build()
            .map_err(|e| Error::HttpClient(format!("Failed to build HTTP client: {e}")))?;

        Ok(Endpoint {
            base_url,
            api_token: self.api_token,
            content_type: self
                .content_type
                .unwrap_or_else(|| JSON_CONTENT_TYPE.to_string()),
            http_client,
            retry: self.retry,
            last_request_path: Mutex::new(None),
            last_response: Mutex::new(None),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|_| {
        Error::configuration(format!("Invalid endpoint URL format: {raw}"), None)
    })?;
    if url.host_str().is_none() || url.cannot_be_a_base() {
        return Err(Error::configuration(
            format!("Invalid endpoint URL: {raw}"),
            None,
        ));
    }
    Ok(url)
}
