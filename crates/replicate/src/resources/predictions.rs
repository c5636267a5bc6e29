//! Predictions

use super::split_results;
use crate::client::Client;
use crate::error::Result;
use crate::http::Payload;
use crate::record::Prediction;
use crate::types::{CreatePredictionParams, Page};
use crate::validation::validate_prediction_id;

impl Client {
    /// Start a prediction.
    ///
    /// The client's default webhook is used when `params` doesn't set one.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use replicate::{AsRecord, Client, types::CreatePredictionParams};
    /// # use serde_json::json;
    /// # async fn example(client: Client) -> replicate::Result<()> {
    /// let params = CreatePredictionParams::new("5c7d5dc6", json!({"prompt": "an astronaut"}))
    ///     .webhook("https://example.com/hooks/replicate");
    /// let prediction = client.create_prediction(params).await?;
    /// println!("{:?}", prediction.id());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_prediction(&self, params: CreatePredictionParams) -> Result<Prediction> {
        let payload = params.into_payload(self.config().webhook_url.as_deref())?;
        let body = self.api_endpoint()?.post("predictions", payload).await?;
        Ok(Prediction::new(self, body.into_json()))
    }

    /// Fetch a prediction by id.
    pub async fn retrieve_prediction(&self, id: &str) -> Result<Prediction> {
        validate_prediction_id(id)?;
        let body = self
            .api_endpoint()?
            .get(&format!("predictions/{id}"))
            .await?;
        Ok(Prediction::new(self, body.into_json()))
    }

    /// Cancel a prediction and return its updated state.
    pub async fn cancel_prediction(&self, id: &str) -> Result<Prediction> {
        validate_prediction_id(id)?;
        let body = self
            .api_endpoint()?
            .post(&format!("predictions/{id}/cancel"), Payload::new())
            .await?;
        Ok(Prediction::new(self, body.into_json()))
    }

    /// List predictions, newest first, one page at a time.
    ///
    /// Pass [`Page::next_cursor`] from the previous page to continue.
    pub async fn list_predictions(&self, cursor: Option<&str>) -> Result<Page<Prediction>> {
        let endpoint = self.api_endpoint()?;
        let body = match cursor {
            Some(cursor) => {
                endpoint
                    .get_with_query("predictions", &[("cursor", cursor)])
                    .await?
            }
            None => endpoint.get("predictions").await?,
        };
        let (results, metadata) = split_results(body, "predictions")?;
        Ok(Page {
            results: results
                .into_iter()
                .map(|data| Prediction::new(self, data))
                .collect(),
            metadata,
        })
    }
}
