//! Main client implementation for the Replicate API

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    config::{ClientConfig, ClientConfigBuilder, ConnectionPoolConfig, Timeouts},
    error::{Error, Result},
    http::{Endpoint, RetryPolicy},
    observability::log_cache_hit,
    record::{Model, ModelVersion},
    upload::UploadPolicy,
};

/// Main client for interacting with the Replicate API.
///
/// The client owns two endpoints (the main API and the training API), the
/// configuration they were built from, and the model and version caches.
/// Cloning is cheap and clones share caches and connection pools.
///
/// # Example
///
/// ```rust,no_run
/// use replicate::Client;
///
/// # async fn example() -> replicate::Result<()> {
/// let client = Client::new("r8_...")?;
/// let model = client.retrieve_model("stability-ai/sdxl").await?;
/// println!("{}", model.identifier());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    config: ClientConfig,
    api_endpoint: Endpoint,
    training_endpoint: Endpoint,
    pub(crate) model_cache: Mutex<HashMap<String, Model>>,
    pub(crate) version_cache: Mutex<HashMap<String, ModelVersion>>,
}

impl Client {
    /// Create a new client with an API token and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank token.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::builder().api_token(api_token).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the `REPLICATE_*` environment variables.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client from a configuration object.
    ///
    /// Both endpoints are built here, so malformed base URLs fail now. A
    /// missing token only fails once an authenticated call is made.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let api_endpoint = Self::endpoint_for(&config, &config.api_base_url)?;
        let training_endpoint = Self::endpoint_for(&config, &config.training_base_url)?;

        tracing::debug!(
            api_base_url = %config.api_base_url,
            training_base_url = %config.training_base_url,
            has_token = config.has_api_token(),
            "Created Replicate client"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                api_endpoint,
                training_endpoint,
                model_cache: Mutex::new(HashMap::new()),
                version_cache: Mutex::new(HashMap::new()),
            }),
        })
    }

    fn endpoint_for(config: &ClientConfig, base_url: &str) -> Result<Endpoint> {
        Endpoint::builder()
            .base_url(base_url)
            .api_token(config.api_token.clone())
            .timeouts(config.timeouts)
            .retry(config.retry.clone())
            .connection_pool(config.connection_pool.clone())
            .user_agent(config.user_agent.clone())
            .build()
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The main API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no API token is configured.
    pub fn api_endpoint(&self) -> Result<&Endpoint> {
        self.require_token()?;
        Ok(&self.inner.api_endpoint)
    }

    /// The training API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no API token is configured.
    pub fn training_endpoint(&self) -> Result<&Endpoint> {
        self.require_token()?;
        Ok(&self.inner.training_endpoint)
    }

    fn require_token(&self) -> Result<()> {
        if self.inner.config.has_api_token() {
            return Ok(());
        }
        Err(Error::configuration(
            "API token is required",
            Some("Set REPLICATE_API_TOKEN or call ClientConfig::set_api_token"),
        ))
    }

    /// Drop every cached model and model version.
    pub fn clear_cache(&self) {
        lock(&self.inner.model_cache).clear();
        lock(&self.inner.version_cache).clear();
        tracing::debug!("Cleared model and version caches");
    }

    pub(crate) fn cached_model(&self, key: &str) -> Option<Model> {
        let hit = lock(&self.inner.model_cache).get(key).cloned();
        if hit.is_some() {
            log_cache_hit("model", key);
        }
        hit
    }

    pub(crate) fn cache_model(&self, key: String, model: Model) {
        lock(&self.inner.model_cache).insert(key, model);
    }

    pub(crate) fn cached_version(&self, key: &str) -> Option<ModelVersion> {
        let hit = lock(&self.inner.version_cache).get(key).cloned();
        if hit.is_some() {
            log_cache_hit("version", key);
        }
        hit
    }

    pub(crate) fn cache_version(&self, key: String, version: ModelVersion) {
        lock(&self.inner.version_cache).insert(key, version);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_base_url", &self.inner.config.api_base_url)
            .field("training_base_url", &self.inner.config.training_base_url)
            .field("has_api_token", &self.inner.config.has_api_token())
            .finish_non_exhaustive()
    }
}

/// Builder for creating a configured [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfigBuilder,
}

impl ClientBuilder {
    /// Set the API token.
    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.config = self.config.api_token(api_token);
        self
    }

    /// Set the main API base URL.
    pub fn api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.api_base_url(base_url);
        self
    }

    /// Set the training API base URL.
    pub fn training_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.training_base_url(base_url);
        self
    }

    /// Set the default webhook.
    pub fn webhook_url(mut self, webhook_url: impl Into<String>) -> Self {
        self.config = self.config.webhook_url(webhook_url);
        self
    }

    /// Set the per-attempt timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config = self.config.timeouts(timeouts);
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config = self.config.retry(retry);
        self
    }

    /// Set the connection pool configuration.
    pub fn connection_pool(mut self, pool: ConnectionPoolConfig) -> Self {
        self.config = self.config.connection_pool(pool);
        self
    }

    /// Set the dataset upload policy.
    pub fn upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.config = self.config.upload_policy(policy);
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Build the client with the configured options.
    pub fn build(self) -> Result<Client> {
        Client::from_config(self.config.build()?)
    }
}

/// The process-wide default client, built from the environment on first use.
///
/// A failed build is not remembered, so fixing the environment and calling
/// again works.
#[cfg(feature = "env")]
pub fn default_client() -> Result<Client> {
    static DEFAULT: std::sync::OnceLock<Client> = std::sync::OnceLock::new();

    if let Some(client) = DEFAULT.get() {
        return Ok(client.clone());
    }
    let client = Client::from_env()?;
    Ok(DEFAULT.get_or_init(|| client).clone())
}
