use super::base::record_variant;
use super::mixins::{Refreshable, Statusable};
use super::Record;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::PredictionView;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

/// A prediction job.
///
/// Predictions order by their `created_at` strings, compared lexically,
/// through [`cmp_created_at`](Self::cmp_created_at). Equality stays
/// structural, so two predictions created at the same instant are
/// `created_same_time` without being `==`.
#[derive(Clone)]
pub struct Prediction {
    record: Record,
}

record_variant!(Prediction);

impl Prediction {
    pub(crate) const KIND: &'static str = "Prediction";

    pub(crate) fn new(client: &Client, data: Value) -> Self {
        Self {
            record: Record::new(client, Self::KIND, data),
        }
    }

    /// Build a prediction from a stored document, not attached to any client.
    pub fn detached(data: Value) -> Self {
        Self {
            record: Record::detached(Self::KIND, data),
        }
    }

    /// Typed view of the document.
    pub fn view(&self) -> Result<PredictionView> {
        self.record.view()
    }

    /// Model output, `None` until the API reports one.
    pub fn output(&self) -> Option<&Value> {
        self.record.get("output").filter(|v| !v.is_null())
    }

    /// Error reported by the model.
    pub fn error(&self) -> Option<&Value> {
        self.record.get("error").filter(|v| !v.is_null())
    }

    /// Captured logs.
    pub fn logs(&self) -> Option<&str> {
        self.record.str_attr("logs")
    }

    /// Raw `created_at` timestamp.
    pub fn created_at(&self) -> Option<&str> {
        self.record.str_attr("created_at")
    }

    fn require_id(&self) -> Result<String> {
        self.record
            .str_attr("id")
            .map(str::to_string)
            .ok_or_else(|| Error::Validation("Prediction ID must be a non-empty string".into()))
    }

    /// Ask the API to cancel this prediction and adopt the returned document.
    pub async fn cancel(&mut self) -> Result<&mut Self> {
        let id = self.require_id()?;
        let fresh = self.record.client()?.cancel_prediction(&id).await?;
        self.record.replace_data(fresh.record.data_handle());
        Ok(self)
    }

    /// Compare creation times as strings.
    ///
    /// `None` when either side lacks a `created_at` string.
    pub fn cmp_created_at(&self, other: &Prediction) -> Option<Ordering> {
        Some(self.created_at()?.cmp(other.created_at()?))
    }

    /// Created strictly before `other`.
    pub fn created_before(&self, other: &Prediction) -> bool {
        self.cmp_created_at(other) == Some(Ordering::Less)
    }

    /// Created strictly after `other`.
    pub fn created_after(&self, other: &Prediction) -> bool {
        self.cmp_created_at(other) == Some(Ordering::Greater)
    }

    /// Same `created_at` string.
    pub fn created_same_time(&self, other: &Prediction) -> bool {
        self.cmp_created_at(other) == Some(Ordering::Equal)
    }

    /// Sort oldest first; predictions without `created_at` go last.
    pub fn sort_by_created_at(predictions: &mut [Prediction]) {
        predictions.sort_by(|a, b| match (a.created_at(), b.created_at()) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

impl Statusable for Prediction {
    fn status_value(&self) -> Option<&Value> {
        self.record.get("status")
    }
}

#[async_trait]
impl Refreshable for Prediction {
    async fn refetch(&mut self) -> Result<&mut Self> {
        let id = self.require_id()?;
        let fresh = self.record.client()?.retrieve_prediction(&id).await?;
        self.record.replace_data(fresh.record.data_handle());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(id: &str, created_at: &str) -> Prediction {
        Prediction::detached(json!({"id": id, "created_at": created_at}))
    }

    #[test]
    fn test_creation_order_is_lexical() {
        let older = at("a", "2024-01-01T00:00:00Z");
        let newer = at("b", "2024-01-02T00:00:00Z");
        let twin = at("c", "2024-01-01T00:00:00Z");

        assert!(older.created_before(&newer));
        assert!(newer.created_after(&older));
        assert!(older.created_same_time(&twin));
        assert_ne!(older, twin);
    }

    #[test]
    fn test_missing_timestamp_is_incomparable() {
        let dated = at("a", "2024-01-01T00:00:00Z");
        let undated = Prediction::detached(json!({"id": "b"}));
        assert_eq!(dated.cmp_created_at(&undated), None);
        assert!(!dated.created_before(&undated));
        assert!(!dated.created_after(&undated));
    }

    #[test]
    fn test_sort_by_created_at() {
        let mut predictions = vec![
            Prediction::detached(json!({"id": "none"})),
            at("late", "2024-03-01T00:00:00Z"),
            at("early", "2024-01-01T00:00:00Z"),
        ];
        Prediction::sort_by_created_at(&mut predictions);
        let ids: Vec<_> = predictions.iter().map(|p| p.record.str_attr("id")).collect();
        assert_eq!(ids, vec![Some("early"), Some("late"), Some("none")]);
    }

    #[test]
    fn test_output_and_status() {
        let prediction = Prediction::detached(json!({
            "id": "p1",
            "status": "succeeded",
            "output": ["x"],
            "error": null,
            "logs": "done",
        }));
        assert_eq!(prediction.output(), Some(&json!(["x"])));
        assert_eq!(prediction.error(), None);
        assert_eq!(prediction.logs(), Some("done"));
        assert!(prediction.is_succeeded());
        assert!(prediction.is_finished());
        assert!(!prediction.is_running());
    }

    #[test]
    fn test_non_object_document_has_no_status() {
        let prediction = Prediction::detached(json!(["not", "a", "map"]));
        assert_eq!(prediction.status(), None);
        assert_eq!(prediction.status_description(), "Unknown status: ");
    }

    #[test]
    fn test_numeric_status_description() {
        let prediction = Prediction::detached(json!({"id": "p1", "status": 5}));
        assert_eq!(prediction.status(), None);
        assert!(!prediction.is_finished());
        assert_eq!(prediction.status_description(), "Unknown status: 5");
    }

    #[tokio::test]
    async fn test_refetch_without_client_keeps_data() {
        let mut prediction = Prediction::detached(json!({"id": "p1", "status": "starting"}));
        let before = prediction.record.data_handle();
        assert!(prediction.refetch().await.is_err());
        assert!(std::sync::Arc::ptr_eq(&before, &prediction.record.data_handle()));
    }
}
