//! Typed views over record documents
//!
//! Views are deserialized copies of a record's document. Every field the API
//! may omit is optional, and fields this client does not model are kept in
//! `extra`.

use super::Status;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A prediction document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionView {
    /// Identifier
    pub id: Option<String>,
    /// Model version
    pub version: Option<String>,
    /// Lifecycle status
    pub status: Option<Status>,
    /// Inputs as submitted
    pub input: Option<Value>,
    /// Model output, once available
    pub output: Option<Value>,
    /// Error reported by the model
    pub error: Option<Value>,
    /// Captured logs
    pub logs: Option<String>,
    /// ISO-8601 creation time
    pub created_at: Option<String>,
    /// ISO-8601 start time
    pub started_at: Option<String>,
    /// ISO-8601 completion time
    pub completed_at: Option<String>,
    /// Related API URLs (`get`, `cancel`, ...)
    pub urls: Option<Map<String, Value>>,
    /// Timing metrics
    pub metrics: Option<Value>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A training document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingView {
    /// Identifier
    pub id: Option<String>,
    /// Destination model
    pub model: Option<String>,
    /// Lifecycle status
    pub status: Option<Status>,
    /// Model version
    pub version: Option<Value>,
    /// Inputs as submitted
    pub input: Option<Value>,
    /// Captured logs
    pub logs: Option<String>,
    /// Error reported by the model
    pub error: Option<Value>,
    /// ISO-8601 creation time
    pub created_at: Option<String>,
    /// ISO-8601 completion time
    pub completed_at: Option<String>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A model version document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelVersionView {
    /// Identifier
    pub id: Option<String>,
    /// ISO-8601 creation time
    pub created_at: Option<String>,
    /// Cog version used to build it
    pub cog_version: Option<String>,
    /// Input/output schema
    pub openapi_schema: Option<Value>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A model document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelView {
    /// Owning user or organization
    pub owner: Option<String>,
    /// Model name
    pub name: Option<String>,
    /// Web page
    pub url: Option<String>,
    /// Description
    pub description: Option<String>,
    /// `public` or `private`
    pub visibility: Option<String>,
    /// Source repository
    pub github_url: Option<String>,
    /// Paper
    pub paper_url: Option<String>,
    /// License
    pub license_url: Option<String>,
    /// Number of runs
    pub run_count: Option<u64>,
    /// Cover image
    pub cover_image_url: Option<String>,
    /// Example prediction
    pub default_example: Option<Value>,
    /// Latest version, when published
    pub latest_version: Option<ModelVersionView>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An upload document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadView {
    /// PUT target for the archive
    pub upload_url: Option<String>,
    /// URL the archive is served from once attached
    pub serving_url: Option<String>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
