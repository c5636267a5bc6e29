//! # Replicate SDK
//!
//! Async Rust client for the Replicate machine-learning hosting API:
//! - Models, model versions and collections, with a per-client cache
//! - Predictions: create, fetch, cancel, list, poll via [`Refreshable`]
//! - Trainings against the training API
//! - Dataset zip uploads streamed straight to storage
//! - Typed errors, automatic retries and structured `tracing` logs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use replicate::prelude::*;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let model = client.retrieve_model("stability-ai/sdxl").await?;
//!     let version = model.latest_version().cloned().ok_or_else(|| {
//!         Error::Model("model has no published version".into())
//!     })?;
//!
//!     let mut prediction = version.predict(json!({"prompt": "an astronaut"}), None).await?;
//!     while !prediction.is_finished() {
//!         tokio::time::sleep(Duration::from_secs(1)).await;
//!         prediction.refetch().await?;
//!     }
//!     println!("{:?}", prediction.output());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, NotFoundKind, Result};
pub use record::{
    AsRecord, Model, ModelVersion, Prediction, Record, Refreshable, Statusable, Training, Upload,
};

#[cfg(feature = "env")]
#[cfg_attr(docsrs, doc(cfg(feature = "env")))]
pub use client::default_client;

// Module declarations
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod record;
mod resources;
pub mod types;
pub mod upload;
pub mod validation;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;
pub use serde_json::Value as JsonValue;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use replicate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AsRecord, Client, ClientConfig, Error, Model, ModelVersion, Prediction, Refreshable,
        Result, Statusable, Training, Upload,
        types::{CreatePredictionParams, CreateTrainingParams, Page, Status, VersionSelector},
    };
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Start a prediction for `version` with the [default client](default_client).
///
/// `webhook` overrides the client's default webhook for this prediction.
#[cfg(feature = "env")]
#[cfg_attr(docsrs, doc(cfg(feature = "env")))]
pub async fn predict(version: &str, input: JsonValue, webhook: Option<&str>) -> Result<Prediction> {
    let mut params = types::CreatePredictionParams::new(version, input);
    if let Some(webhook) = webhook {
        params = params.webhook(webhook);
    }
    default_client()?.create_prediction(params).await
}

/// Look up a model with the [default client](default_client).
///
/// `version` selects the latest model, every version (`"all"`) or one
/// version by id, as in [`Client::retrieve_model_with`].
#[cfg(feature = "env")]
#[cfg_attr(docsrs, doc(cfg(feature = "env")))]
pub async fn model(
    identifier: &str,
    version: impl Into<types::VersionSelector>,
) -> Result<types::ModelLookup> {
    default_client()?
        .retrieve_model_with(identifier, version)
        .await
}
