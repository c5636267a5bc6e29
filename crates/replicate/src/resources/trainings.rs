//! Trainings (served by the training API)

use crate::client::Client;
use crate::error::Result;
use crate::record::Training;
use crate::types::CreateTrainingParams;
use crate::validation::validate_training_id;

impl Client {
    /// Start a training job on the training API.
    ///
    /// The client's default webhook is used when `params` doesn't set one.
    pub async fn create_training(&self, params: CreateTrainingParams) -> Result<Training> {
        let payload = params.into_payload(self.config().webhook_url.as_deref())?;
        let body = self.training_endpoint()?.post("trainings", payload).await?;
        Ok(Training::new(self, body.into_json()))
    }

    /// Fetch a training by id.
    pub async fn retrieve_training(&self, id: &str) -> Result<Training> {
        validate_training_id(id)?;
        let body = self
            .training_endpoint()?
            .get(&format!("trainings/{id}"))
            .await?;
        Ok(Training::new(self, body.into_json()))
    }
}
