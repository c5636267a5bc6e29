use super::base::record_variant;
use super::{ModelVersion, Record};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::ModelView;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A model and, when the API included it, its latest version.
///
/// Clones share the memoized version list.
#[derive(Clone)]
pub struct Model {
    record: Record,
    latest_version: Option<ModelVersion>,
    versions: Arc<OnceCell<Arc<Vec<ModelVersion>>>>,
}

record_variant!(Model);

impl Model {
    pub(crate) const KIND: &'static str = "Model";

    pub(crate) fn new(client: &Client, data: Value) -> Self {
        Self::from_record(Record::new(client, Self::KIND, data))
    }

    /// Build a model from a stored document, not attached to any client.
    pub fn detached(data: Value) -> Self {
        Self::from_record(Record::detached(Self::KIND, data))
    }

    fn from_record(record: Record) -> Self {
        let latest_version = record
            .get("latest_version")
            .filter(|v| !v.is_null())
            .cloned()
            .map(|data| ModelVersion::from_record(record.child(ModelVersion::KIND, data)));
        Self {
            record,
            latest_version,
            versions: Arc::new(OnceCell::new()),
        }
    }

    /// Typed view of the document.
    pub fn view(&self) -> Result<ModelView> {
        self.record.view()
    }

    /// Owner name, if present.
    pub fn owner(&self) -> Option<&str> {
        self.record.str_attr("owner")
    }

    /// Model name, if present.
    pub fn name(&self) -> Option<&str> {
        self.record.str_attr("name")
    }

    /// `owner/name`, with missing parts left empty.
    pub fn identifier(&self) -> String {
        format!(
            "{}/{}",
            self.owner().unwrap_or_default(),
            self.name().unwrap_or_default()
        )
    }

    /// The embedded latest version.
    pub fn latest_version(&self) -> Option<&ModelVersion> {
        self.latest_version.as_ref()
    }

    /// Every version of this model.
    ///
    /// Fetched on first call and memoized for the life of this object and
    /// its clones. A failed fetch is not memoized.
    pub async fn versions(&self) -> Result<Arc<Vec<ModelVersion>>> {
        let versions = self
            .versions
            .get_or_try_init(|| async {
                let client = self.record.client()?;
                let versions = client.retrieve_model_versions(&self.identifier()).await?;
                Ok::<_, Error>(Arc::new(versions))
            })
            .await?;
        Ok(Arc::clone(versions))
    }
}
