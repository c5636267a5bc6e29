//! Dataset uploads for trainings

use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::{Endpoint, Payload, Response};
use crate::record::Upload;
use crate::upload::{validate_upload_url, validate_zip_file};
use std::path::Path;

impl Client {
    /// Validate a local zip archive, create an upload for it and PUT the
    /// bytes to the returned upload URL.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use replicate::Client;
    /// # async fn example(client: Client) -> replicate::Result<()> {
    /// let upload = client.upload_zip("training-data.zip").await?;
    /// println!("{:?}", upload.serving_url());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_zip(&self, path: impl AsRef<Path>) -> Result<Upload> {
        let path = path.as_ref();
        let zip = validate_zip_file(path, &self.config().upload).await?;
        let upload = self.create_upload(&zip.filename).await?;
        upload.attach(path).await?;
        Ok(upload)
    }

    /// Create an upload slot for `filename` on the training API.
    pub async fn create_upload(&self, filename: &str) -> Result<Upload> {
        let filename = match filename.trim() {
            "" => "data.zip",
            name => name,
        };
        let body = self
            .training_endpoint()?
            .post(&format!("upload/{filename}"), Payload::new())
            .await?;
        Ok(Upload::new(self, body.into_json()))
    }

    /// PUT the zip archive at `path` to a pre-signed `upload_url`.
    ///
    /// The request goes straight to storage: no API token is sent. The URL
    /// must satisfy the configured upload policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a rejected URL or archive, and
    /// [`Error::Upload`] when storage answers with a non-2xx status.
    pub async fn update_upload(&self, upload_url: &str, path: impl AsRef<Path>) -> Result<Response> {
        let config = self.config();
        let url = validate_upload_url(upload_url, &config.upload)?;
        let zip = validate_zip_file(path.as_ref(), &config.upload).await?;

        let endpoint = Endpoint::builder()
            .base_url(url.as_str())
            .api_token(None)
            .timeouts(config.timeouts)
            .retry(config.retry.clone())
            .connection_pool(config.connection_pool.clone())
            .user_agent(config.user_agent.clone())
            .build()?;

        let response = endpoint.put_file(&zip).await?;
        if response.is_success() {
            tracing::info!(
                file = %zip.filename,
                bytes = zip.len,
                status = response.status().as_u16(),
                "Uploaded dataset archive"
            );
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = match response.into_body().into_json() {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Err(Error::Upload {
            message: format!("Upload failed ({status}): {body}"),
            status: Some(status),
            body: Some(body),
        })
    }
}
