//! Capabilities shared by record variants

use crate::error::Result;
use crate::types::Status;
use async_trait::async_trait;
use serde_json::Value;

/// Records that can reload their document from the API.
///
/// A refetch replaces the document wholesale and keeps the object itself,
/// so handles to the old document stay valid but stop being current. On
/// failure the previous document is left untouched.
#[async_trait]
pub trait Refreshable: Send {
    /// Reload the document from the API.
    async fn refetch(&mut self) -> Result<&mut Self>;

    /// Whether the document may be out of date. Always `false` unless overridden.
    fn is_stale(&self) -> bool {
        false
    }

    /// Refetch only when [`is_stale`](Self::is_stale) says so.
    async fn refetch_if_stale(&mut self) -> Result<&mut Self> {
        if self.is_stale() {
            self.refetch().await?;
        }
        Ok(self)
    }
}

/// Records with an asynchronous lifecycle `status` field.
///
/// A missing status, a non-string status, or a document that is not an
/// object all read as "no status": every predicate is `false`.
pub trait Statusable {
    /// Raw `status` value, whatever its JSON type.
    fn status_value(&self) -> Option<&Value>;

    /// `status` as a string, if it is one.
    fn status_field(&self) -> Option<&str> {
        self.status_value()?.as_str()
    }

    /// Parsed status.
    fn status(&self) -> Option<Status> {
        self.status_field().map(Status::parse)
    }

    /// Status is `starting`.
    fn is_starting(&self) -> bool {
        self.status_field() == Some("starting")
    }

    /// Status is `processing`.
    fn is_processing(&self) -> bool {
        self.status_field() == Some("processing")
    }

    /// Status is `succeeded`.
    fn is_succeeded(&self) -> bool {
        self.status_field() == Some("succeeded")
    }

    /// Status is `failed`.
    fn is_failed(&self) -> bool {
        self.status_field() == Some("failed")
    }

    /// Status is `canceled`.
    fn is_canceled(&self) -> bool {
        self.status_field() == Some("canceled")
    }

    /// Starting or processing.
    fn is_running(&self) -> bool {
        self.is_starting() || self.is_processing()
    }

    /// Succeeded, failed or canceled.
    fn is_finished(&self) -> bool {
        self.is_succeeded() || self.is_failed() || self.is_canceled()
    }

    /// Human readable status.
    ///
    /// Non-string values are rendered as JSON in the unknown-status text.
    fn status_description(&self) -> String {
        match (self.status(), self.status_value()) {
            (Some(status), _) => status.description(),
            (None, None | Some(Value::Null)) => "Unknown status: ".to_string(),
            (None, Some(raw)) => format!("Unknown status: {raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;
    use rstest::rstest;

    struct Fixed(Option<Value>);

    impl Fixed {
        fn text(status: &str) -> Self {
            Self(Some(Value::String(status.to_string())))
        }
    }

    impl Statusable for Fixed {
        fn status_value(&self) -> Option<&Value> {
            self.0.as_ref()
        }
    }

    #[rstest]
    #[case("starting", "Starting execution")]
    #[case("processing", "Processing")]
    #[case("succeeded", "Completed successfully")]
    #[case("failed", "Failed")]
    #[case("canceled", "Canceled")]
    #[case("queued", "Unknown status: queued")]
    fn test_status_description(#[case] status: &str, #[case] expected: &str) {
        assert_eq!(Fixed::text(status).status_description(), expected);
    }

    #[test]
    fn test_missing_status() {
        let record = Fixed(None);
        assert_eq!(record.status_description(), "Unknown status: ");
        assert_eq!(record.status(), None);
        assert!(!record.is_running());
        assert!(!record.is_finished());
        assert_eq!(Fixed(Some(Value::Null)).status_description(), "Unknown status: ");
    }

    #[test]
    fn test_non_string_status() {
        let record = Fixed(Some(serde_json::json!(5)));
        assert_eq!(record.status_field(), None);
        assert_eq!(record.status(), None);
        assert!(!record.is_running());
        assert!(!record.is_finished());
        assert_eq!(record.status_description(), "Unknown status: 5");
        assert_eq!(
            Fixed(Some(serde_json::json!(true))).status_description(),
            "Unknown status: true"
        );
    }

    const KNOWN: [&str; 5] = ["starting", "processing", "succeeded", "failed", "canceled"];

    fn predicates(record: &Fixed) -> [bool; 5] {
        [
            record.is_starting(),
            record.is_processing(),
            record.is_succeeded(),
            record.is_failed(),
            record.is_canceled(),
        ]
    }

    proptest! {
        #[test]
        fn prop_known_statuses_partition(index in 0usize..5) {
            let status = KNOWN[index];
            let record = Fixed::text(status);
            let flags = predicates(&record);
            prop_assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            prop_assert!(flags[index]);
            prop_assert_eq!(record.is_running(), index < 2);
            prop_assert_eq!(record.is_finished(), index >= 2);
            prop_assert_eq!(record.is_running(), !record.is_finished());
        }

        #[test]
        fn prop_unknown_statuses_match_nothing(raw in "[a-z_]{0,12}") {
            prop_assume!(!KNOWN.contains(&raw.as_str()));
            let record = Fixed::text(&raw);
            prop_assert!(predicates(&record).iter().all(|f| !*f));
            prop_assert!(!record.is_running());
            prop_assert!(!record.is_finished());
            prop_assert_eq!(record.status_description(), format!("Unknown status: {raw}"));
            prop_assert_eq!(record.status_description(), record.status_description());
        }
    }

    struct Counter {
        stale: bool,
        refetches: u32,
        fail: bool,
    }

    #[async_trait]
    impl Refreshable for Counter {
        async fn refetch(&mut self) -> Result<&mut Self> {
            if self.fail {
                return Err(Error::Connection("offline".into()));
            }
            self.refetches += 1;
            Ok(self)
        }

        fn is_stale(&self) -> bool {
            self.stale
        }
    }

    #[tokio::test]
    async fn test_refetch_if_stale_only_refetches_stale_records() {
        let mut fresh = Counter {
            stale: false,
            refetches: 0,
            fail: false,
        };
        fresh.refetch_if_stale().await.unwrap();
        assert_eq!(fresh.refetches, 0);

        let mut stale = Counter {
            stale: true,
            refetches: 0,
            fail: false,
        };
        stale.refetch_if_stale().await.unwrap().refetch_if_stale().await.unwrap();
        assert_eq!(stale.refetches, 2);
    }

    #[tokio::test]
    async fn test_refetch_if_stale_propagates_errors() {
        let mut broken = Counter {
            stale: true,
            refetches: 0,
            fail: true,
        };
        assert!(broken.refetch_if_stale().await.is_err());

        broken.stale = false;
        assert!(broken.refetch_if_stale().await.is_ok());
    }
}
