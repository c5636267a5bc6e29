//! Models, model versions and collections

use super::split_results;
use crate::client::Client;
use crate::error::Result;
use crate::record::{Model, ModelVersion};
use crate::types::{ModelLookup, VersionSelector};
use crate::validation::{validate_collection_slug, validate_model_identifier};
use serde_json::Value;

impl Client {
    /// Fetch a collection by slug, returned as the raw document.
    pub async fn retrieve_collection(&self, slug: &str) -> Result<Value> {
        validate_collection_slug(slug)?;
        let body = self
            .api_endpoint()?
            .get(&format!("collections/{slug}"))
            .await?;
        Ok(body.into_json())
    }

    /// Look up a model, all of its versions, or one version.
    ///
    /// `latest` and specific versions are served from the cache after the
    /// first fetch; `all` always goes to the API.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use replicate::{Client, types::ModelLookup};
    /// # async fn example(client: Client) -> replicate::Result<()> {
    /// match client.retrieve_model_with("stability-ai/sdxl", "all").await? {
    ///     ModelLookup::Versions(versions) => println!("{} versions", versions.len()),
    ///     _ => unreachable!(),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn retrieve_model_with(
        &self,
        identifier: &str,
        version: impl Into<VersionSelector>,
    ) -> Result<ModelLookup> {
        validate_model_identifier(identifier)?;
        let selector = version.into();
        selector.validate()?;

        match selector {
            VersionSelector::Latest => self.retrieve_model(identifier).await.map(ModelLookup::Model),
            VersionSelector::All => self
                .retrieve_model_versions(identifier)
                .await
                .map(ModelLookup::Versions),
            VersionSelector::Version(id) => self
                .retrieve_model_version(identifier, &id)
                .await
                .map(ModelLookup::Version),
        }
    }

    /// Fetch a model with its latest version.
    pub async fn retrieve_model(&self, identifier: &str) -> Result<Model> {
        validate_model_identifier(identifier)?;
        let key = format!("{identifier}:{}", VersionSelector::Latest);
        if let Some(model) = self.cached_model(&key) {
            return Ok(model);
        }

        let body = self
            .api_endpoint()?
            .get(&format!("models/{identifier}"))
            .await?;
        let model = Model::new(self, body.into_json());
        self.cache_model(key, model.clone());
        Ok(model)
    }

    /// Fetch every version of a model. Never cached.
    pub async fn retrieve_model_versions(&self, identifier: &str) -> Result<Vec<ModelVersion>> {
        validate_model_identifier(identifier)?;
        let body = self
            .api_endpoint()?
            .get(&format!("models/{identifier}/versions"))
            .await?;
        let (results, _) = split_results(body, "model versions")?;
        Ok(results
            .into_iter()
            .map(|data| ModelVersion::new(self, data))
            .collect())
    }

    /// Fetch one version of a model.
    pub async fn retrieve_model_version(
        &self,
        identifier: &str,
        version: &str,
    ) -> Result<ModelVersion> {
        validate_model_identifier(identifier)?;
        VersionSelector::Version(version.to_string()).validate()?;
        let key = format!("{identifier}:{version}");
        if let Some(version) = self.cached_version(&key) {
            return Ok(version);
        }

        let body = self
            .api_endpoint()?
            .get(&format!("models/{identifier}/versions/{version}"))
            .await?;
        let version = ModelVersion::new(self, body.into_json());
        self.cache_version(key, version.clone());
        Ok(version)
    }
}
