use super::base::record_variant;
use super::mixins::{Refreshable, Statusable};
use super::{ModelVersion, Record};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::TrainingView;
use async_trait::async_trait;
use serde_json::{Value, json};

/// A training (fine-tuning) job.
#[derive(Clone)]
pub struct Training {
    record: Record,
}

record_variant!(Training);

impl Training {
    pub(crate) const KIND: &'static str = "Training";

    pub(crate) fn new(client: &Client, data: Value) -> Self {
        Self {
            record: Record::new(client, Self::KIND, data),
        }
    }

    /// Build a training from a stored document, not attached to any client.
    pub fn detached(data: Value) -> Self {
        Self {
            record: Record::detached(Self::KIND, data),
        }
    }

    /// Typed view of the document.
    pub fn view(&self) -> Result<TrainingView> {
        self.record.view()
    }

    /// The version produced by this training.
    ///
    /// The API reports either a version object or a bare version id; a bare
    /// id is wrapped as `{"id": ...}`.
    pub fn version(&self) -> Option<ModelVersion> {
        let data = match self.record.get("version")? {
            Value::Null => return None,
            Value::String(id) => json!({ "id": id }),
            other => other.clone(),
        };
        Some(ModelVersion::from_record(
            self.record.child(ModelVersion::KIND, data),
        ))
    }
}

impl Statusable for Training {
    fn status_value(&self) -> Option<&Value> {
        self.record.get("status")
    }
}

#[async_trait]
impl Refreshable for Training {
    async fn refetch(&mut self) -> Result<&mut Self> {
        let id = self
            .record
            .str_attr("id")
            .map(str::to_string)
            .ok_or_else(|| Error::Validation("Training ID must be a non-empty string".into()))?;
        let fresh = self.record.client()?.retrieve_training(&id).await?;
        self.record.replace_data(fresh.record.data_handle());
        Ok(self)
    }
}
