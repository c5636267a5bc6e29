//! Request parameters for resource operations

use crate::error::{Error, Result};
use crate::http::Payload;
use crate::record::{Model, ModelVersion};
use crate::validation::{
    normalize_input, validate_model_identifier, validate_version, validate_webhook_url,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Parameters for creating a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePredictionParams {
    /// Model version id
    pub version: String,
    /// Model inputs; must be a JSON object
    pub input: Value,
    /// Callback URL for state changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    /// Which events trigger the webhook (`start`, `output`, `logs`, `completed`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_events_filter: Option<Vec<String>>,
}

impl CreatePredictionParams {
    /// Create parameters for `version` with `input`.
    pub fn new(version: impl Into<String>, input: Value) -> Self {
        Self {
            version: version.into(),
            input,
            webhook: None,
            webhook_events_filter: None,
        }
    }

    /// Set the webhook.
    pub fn webhook(mut self, webhook: impl Into<String>) -> Self {
        self.webhook = Some(webhook.into());
        self
    }

    /// Restrict webhook events.
    pub fn webhook_events_filter<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.webhook_events_filter = Some(events.into_iter().map(Into::into).collect());
        self
    }

    /// Validate and build the request payload.
    ///
    /// Checks run in order: version, input, webhook. `default_webhook` is
    /// used only when no webhook was given.
    pub fn into_payload(self, default_webhook: Option<&str>) -> Result<Payload> {
        validate_version(&self.version)?;
        let input = normalize_input(self.input)?;
        let webhook = match self.webhook {
            Some(webhook) => {
                let webhook = webhook.trim().to_string();
                validate_webhook_url(&webhook)?;
                Some(webhook)
            }
            None => default_webhook.map(str::to_string),
        };

        let mut payload = Payload::new()
            .field("version", self.version.trim())
            .field("input", Value::Object(input));
        if let Some(webhook) = webhook {
            payload = payload.field("webhook", webhook);
        }
        if let Some(events) = self.webhook_events_filter {
            payload = payload.field("webhook_events_filter", events);
        }
        Ok(payload)
    }
}

/// Parameters for creating a training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrainingParams {
    /// Training inputs (`instance_prompt`, `instance_data`, ...)
    pub input: Value,
    /// Destination model, `owner/name`
    pub model: String,
    /// Callback URL for state changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    /// Additional top-level fields passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateTrainingParams {
    /// Create parameters training `model` with `input`.
    pub fn new(model: impl Into<String>, input: Value) -> Self {
        Self {
            input,
            model: model.into(),
            webhook: None,
            extra: Map::new(),
        }
    }

    /// Set the webhook.
    pub fn webhook(mut self, webhook: impl Into<String>) -> Self {
        self.webhook = Some(webhook.into());
        self
    }

    /// Add a top-level field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Validate and build the request payload, injecting `default_webhook`
    /// when no webhook was given.
    pub fn into_payload(self, default_webhook: Option<&str>) -> Result<Payload> {
        validate_model_identifier(&self.model)?;
        let input = normalize_input(self.input)?;
        if let Some(webhook) = &self.webhook {
            validate_webhook_url(webhook)?;
        }

        let mut payload = Payload::new();
        for (key, value) in self.extra {
            payload = payload.field(key, value);
        }
        payload = payload
            .field("input", Value::Object(input))
            .field("model", self.model);
        if let Some(webhook) = self.webhook.or_else(|| default_webhook.map(str::to_string)) {
            payload = payload.field("webhook", webhook.trim());
        }
        Ok(payload)
    }
}

/// Which part of a model to retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VersionSelector {
    /// The model with its latest version
    #[default]
    Latest,
    /// Every version, always fetched live
    All,
    /// One specific version id
    Version(String),
}

impl VersionSelector {
    /// Reject blank version ids.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Version(id) if id.trim().is_empty() => Err(Error::Validation(
                "Version must be latest, all, or a non-empty string".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::All => f.write_str("all"),
            Self::Version(id) => f.write_str(id),
        }
    }
}

impl From<&str> for VersionSelector {
    fn from(raw: &str) -> Self {
        match raw {
            "latest" => Self::Latest,
            "all" => Self::All,
            id => Self::Version(id.to_string()),
        }
    }
}

impl From<String> for VersionSelector {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

/// Result of a model lookup, shaped by the [`VersionSelector`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelLookup {
    /// [`VersionSelector::Latest`]
    Model(Model),
    /// [`VersionSelector::All`]
    Versions(Vec<ModelVersion>),
    /// [`VersionSelector::Version`]
    Version(ModelVersion),
}

impl ModelLookup {
    /// The model, for a `Latest` lookup.
    pub fn into_model(self) -> Option<Model> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// The versions, for an `All` lookup.
    pub fn into_versions(self) -> Option<Vec<ModelVersion>> {
        match self {
            Self::Versions(versions) => Some(versions),
            _ => None,
        }
    }

    /// The version, for a specific-version lookup.
    pub fn into_version(self) -> Option<ModelVersion> {
        match self {
            Self::Version(version) => Some(version),
            _ => None,
        }
    }
}
