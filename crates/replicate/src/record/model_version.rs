use super::base::record_variant;
use super::{Prediction, Record};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{CreatePredictionParams, ModelVersionView};
use serde_json::Value;

/// One published version of a model.
#[derive(Clone)]
pub struct ModelVersion {
    record: Record,
}

record_variant!(ModelVersion);

impl ModelVersion {
    pub(crate) const KIND: &'static str = "ModelVersion";

    pub(crate) fn new(client: &Client, data: Value) -> Self {
        Self {
            record: Record::new(client, Self::KIND, data),
        }
    }

    /// Build a version from a stored document, not attached to any client.
    pub fn detached(data: Value) -> Self {
        Self {
            record: Record::detached(Self::KIND, data),
        }
    }

    pub(crate) fn from_record(record: Record) -> Self {
        Self { record }
    }

    /// Typed view of the document.
    pub fn view(&self) -> Result<ModelVersionView> {
        self.record.view()
    }

    /// Run this version with `input`.
    pub async fn predict(&self, input: Value, webhook: Option<&str>) -> Result<Prediction> {
        let id = self
            .record
            .str_attr("id")
            .ok_or_else(|| Error::Model("Model version has no id".to_string()))?;
        let mut params = CreatePredictionParams::new(id, input);
        if let Some(webhook) = webhook {
            params = params.webhook(webhook);
        }
        self.record.client()?.create_prediction(params).await
    }
}
