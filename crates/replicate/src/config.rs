//! Configuration for the Replicate client

use crate::error::{Error, Result};
use crate::http::RetryPolicy;
use crate::upload::UploadPolicy;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Default base URL of the main API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.replicate.com/v1";

/// Default base URL of the training API.
pub const DEFAULT_TRAINING_BASE_URL: &str = "https://dreambooth-api-experimental.replicate.com/v1";

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "REPLICATE_API_TOKEN";
/// Environment variable holding the default webhook URL.
pub const ENV_WEBHOOK_URL: &str = "REPLICATE_WEBHOOK_URL";
/// Environment variable overriding the main API base URL.
pub const ENV_API_ENDPOINT_URL: &str = "REPLICATE_API_ENDPOINT_URL";
/// Environment variable overriding the training API base URL.
pub const ENV_TRAINING_ENDPOINT_URL: &str = "REPLICATE_DREAMBOOTH_ENDPOINT_URL";

/// Configuration for the Replicate client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API token sent as `Authorization: Token ...`
    pub api_token: Option<SecretString>,

    /// Base URL of the main API
    pub api_base_url: String,

    /// Base URL of the training API
    pub training_base_url: String,

    /// Webhook injected into predictions and trainings that don't set one
    pub webhook_url: Option<String>,

    /// Per-attempt time budget
    pub timeouts: Timeouts,

    /// Retry behavior shared by both endpoints
    pub retry: RetryPolicy,

    /// Connection pool configuration
    pub connection_pool: ConnectionPoolConfig,

    /// Rules applied to dataset uploads
    pub upload: UploadPolicy,

    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            training_base_url: DEFAULT_TRAINING_BASE_URL.to_string(),
            webhook_url: None,
            timeouts: Timeouts::default(),
            retry: RetryPolicy::default(),
            connection_pool: ConnectionPoolConfig::default(),
            upload: UploadPolicy::default(),
            user_agent: default_user_agent(),
        }
    }
}

/// `replicate-rust/{version}`
pub fn default_user_agent() -> String {
    format!("replicate-rust/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Create a configuration with an API token.
    pub fn with_api_token(api_token: impl Into<String>) -> Result<Self> {
        let mut config = Self::default();
        config.set_api_token(api_token)?;
        Ok(config)
    }

    /// Set the API token. Blank tokens are rejected.
    pub fn set_api_token(&mut self, api_token: impl Into<String>) -> Result<()> {
        let token = api_token.into();
        if token.trim().is_empty() {
            return Err(Error::Validation("API token cannot be empty".into()));
        }
        self.api_token = Some(SecretString::new(token.into_boxed_str()));
        Ok(())
    }

    /// Set the default webhook. Must be an absolute http(s) URL.
    pub fn set_webhook_url(&mut self, webhook_url: impl Into<String>) -> Result<()> {
        let webhook_url = webhook_url.into();
        crate::validation::validate_webhook_url(&webhook_url)?;
        self.webhook_url = Some(webhook_url);
        Ok(())
    }

    /// Whether a non-blank token is configured.
    pub fn has_api_token(&self) -> bool {
        self.api_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().trim().is_empty())
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// This will look for:
    /// - `REPLICATE_API_TOKEN` for authentication
    /// - `REPLICATE_WEBHOOK_URL` for the default webhook
    /// - `REPLICATE_API_ENDPOINT_URL` for the main API base URL
    /// - `REPLICATE_DREAMBOOTH_ENDPOINT_URL` for the training API base URL
    ///
    /// Blank values are treated as unset.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Ok(token) = env::var(ENV_API_TOKEN)
            && !token.trim().is_empty()
        {
            config.set_api_token(token)?;
        }

        if let Ok(webhook) = env::var(ENV_WEBHOOK_URL)
            && !webhook.trim().is_empty()
        {
            config.set_webhook_url(webhook)?;
        }

        if let Ok(base_url) = env::var(ENV_API_ENDPOINT_URL)
            && !base_url.trim().is_empty()
        {
            config.api_base_url = base_url;
        }

        if let Ok(base_url) = env::var(ENV_TRAINING_ENDPOINT_URL)
            && !base_url.trim().is_empty()
        {
            config.training_base_url = base_url;
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence
    /// for every field it changed from the default.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        let defaults = ClientConfig::default();
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.api_base_url != defaults.api_base_url {
            self.api_base_url = other.api_base_url;
        }
        if other.training_base_url != defaults.training_base_url {
            self.training_base_url = other.training_base_url;
        }
        if other.webhook_url.is_some() {
            self.webhook_url = other.webhook_url;
        }
        if other.timeouts != defaults.timeouts {
            self.timeouts = other.timeouts;
        }
        if other.retry != defaults.retry {
            self.retry = other.retry;
        }
        if other.connection_pool != defaults.connection_pool {
            self.connection_pool = other.connection_pool;
        }
        if other.upload != defaults.upload {
            self.upload = other.upload;
        }
        if other.user_agent != defaults.user_agent {
            self.user_agent = other.user_agent;
        }
        self
    }
}

/// Per-attempt time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Whole request, connect to last body byte
    pub total: Duration,
    /// TCP/TLS connect
    pub connect: Duration,
    /// Gap between reads
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            total: Duration::from_secs(30),
            connect: Duration::from_secs(10),
            read: Duration::from_secs(20),
        }
    }
}

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPoolConfig {
    /// Maximum number of idle connections per host
    pub max_idle_per_host: usize,

    /// Idle connection timeout
    pub idle_timeout: Duration,

    /// TCP keep-alive interval
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

/// Builder for creating [`ClientConfig`] with a fluent API.
///
/// Setter input is checked in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
    api_token: Option<String>,
    webhook_url: Option<String>,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API token.
    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Set the main API base URL.
    pub fn api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api_base_url = base_url.into();
        self
    }

    /// Set the training API base URL.
    pub fn training_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.training_base_url = base_url.into();
        self
    }

    /// Set the default webhook.
    pub fn webhook_url(mut self, webhook_url: impl Into<String>) -> Self {
        self.webhook_url = Some(webhook_url.into());
        self
    }

    /// Set the per-attempt timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set connection pool configuration.
    pub fn connection_pool(mut self, config: ConnectionPoolConfig) -> Self {
        self.config.connection_pool = config;
        self
    }

    /// Set the upload policy.
    pub fn upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.config.upload = policy;
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank token or a malformed webhook.
    pub fn build(self) -> Result<ClientConfig> {
        let mut config = self.config;
        if let Some(token) = self.api_token {
            config.set_api_token(token)?;
        }
        if let Some(webhook) = self.webhook_url {
            config.set_webhook_url(webhook)?;
        }
        Ok(config)
    }
}
