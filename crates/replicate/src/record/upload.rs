use super::Record;
use super::base::record_variant;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::Response;
use crate::types::UploadView;
use serde_json::Value;
use std::path::Path;

/// A pending dataset upload: where to PUT the archive and where it will be
/// served from afterwards.
#[derive(Clone)]
pub struct Upload {
    record: Record,
}

record_variant!(Upload);

impl Upload {
    pub(crate) const KIND: &'static str = "Upload";

    pub(crate) fn new(client: &Client, data: Value) -> Self {
        Self {
            record: Record::new(client, Self::KIND, data),
        }
    }

    /// Build an upload from a stored document, not attached to any client.
    pub fn detached(data: Value) -> Self {
        Self {
            record: Record::detached(Self::KIND, data),
        }
    }

    /// Typed view of the document.
    pub fn view(&self) -> Result<UploadView> {
        self.record.view()
    }

    /// Pre-signed URL to PUT the archive to.
    pub fn upload_url(&self) -> Option<&str> {
        self.record.str_attr("upload_url")
    }

    /// URL the archive is served from once uploaded.
    pub fn serving_url(&self) -> Option<&str> {
        self.record.str_attr("serving_url")
    }

    /// PUT the zip archive at `path` to [`upload_url`](Self::upload_url).
    pub async fn attach(&self, path: impl AsRef<Path>) -> Result<Response> {
        let url = self
            .upload_url()
            .ok_or_else(|| Error::Validation("Upload URL must be a non-empty string".into()))?;
        self.record.client()?.update_upload(url, path.as_ref()).await
    }
}
