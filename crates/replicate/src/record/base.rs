use crate::client::{Client, ClientInner};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// An immutable JSON document returned by the API, plus a handle back to the
/// client that fetched it.
///
/// The document is shared behind an [`Arc`] and only ever handed out by
/// shared reference, so it cannot be mutated after construction. A refetch
/// swaps in a new document wholesale.
///
/// The client handle is weak: records cached inside the client don't keep it
/// alive, and follow-up calls on a record whose client is gone fail with
/// [`Error::Configuration`].
#[derive(Clone)]
pub struct Record {
    kind: &'static str,
    data: Arc<Value>,
    client: Weak<ClientInner>,
}

impl Record {
    pub(crate) fn new(client: &Client, kind: &'static str, data: Value) -> Self {
        Self {
            kind,
            data: Arc::new(data),
            client: Arc::downgrade(&client.inner),
        }
    }

    /// A record not attached to any client.
    ///
    /// Useful for building records from stored documents; follow-up calls
    /// fail with [`Error::Configuration`].
    pub fn detached(kind: &'static str, data: Value) -> Self {
        Self {
            kind,
            data: Arc::new(data),
            client: Weak::new(),
        }
    }

    /// A record of another kind attached to the same client.
    pub(crate) fn child(&self, kind: &'static str, data: Value) -> Self {
        Self {
            kind,
            data: Arc::new(data),
            client: Weak::clone(&self.client),
        }
    }

    /// Name of the record variant (`"Prediction"`, `"Model"`, ...).
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The underlying document.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Shared handle to the current document.
    ///
    /// Two handles are pointer-equal until the record is refetched.
    pub fn data_handle(&self) -> Arc<Value> {
        Arc::clone(&self.data)
    }

    /// Look up a top-level attribute.
    ///
    /// Returns `None` if the attribute is absent or the document is not an object.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.as_object()?.get(name)
    }

    /// Whether a top-level attribute exists.
    pub fn has_attr(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Look up a top-level attribute, failing if it does not exist.
    ///
    /// A present attribute whose value is `null` is returned as `null`.
    pub fn attr(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| Error::NoSuchAttribute {
            record: self.kind,
            name: name.to_string(),
        })
    }

    /// A top-level attribute as a string, if it is one.
    pub fn str_attr(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Deserialize the document into a typed view.
    pub fn view<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&*self.data)?)
    }

    /// The owning client.
    pub fn client(&self) -> Result<Client> {
        self.client
            .upgrade()
            .map(Client::from_inner)
            .ok_or_else(|| {
                Error::configuration(
                    format!("{} is not attached to a live client", self.kind),
                    Some("Keep the Client alive while using records it returned"),
                )
            })
    }

    pub(crate) fn replace_data(&mut self, data: Arc<Value>) {
        self.data = data;
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.data == other.data
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        // Object keys serialize in sorted order, so equal documents hash equally.
        self.data.to_string().hash(state);
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} @data={{...}}>", self.kind)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Access to the [`Record`] underneath a typed variant.
pub trait AsRecord {
    /// The wrapped record.
    fn record(&self) -> &Record;

    /// The underlying document.
    fn data(&self) -> &Value {
        self.record().data()
    }

    /// Look up a top-level attribute.
    fn get(&self, name: &str) -> Option<&Value> {
        self.record().get(name)
    }

    /// Look up a top-level attribute, failing if it does not exist.
    fn attr(&self, name: &str) -> Result<&Value> {
        self.record().attr(name)
    }

    /// The `id` attribute, if present and a string.
    fn id(&self) -> Option<&str> {
        self.record().str_attr("id")
    }
}

impl AsRecord for Record {
    fn record(&self) -> &Record {
        self
    }
}

/// Implements [`AsRecord`], equality, hashing and formatting for a variant
/// whose first field is `record: Record`.
macro_rules! record_variant {
    ($name:ident) => {
        impl $crate::record::AsRecord for $name {
            fn record(&self) -> &$crate::record::Record {
                &self.record
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.record == other.record
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.record, state);
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.record, f)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.record, f)
            }
        }
    };
}

pub(crate) use record_variant;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_attribute_access() {
        let record = Record::detached("Prediction", json!({"id": "test", "output": null}));
        assert_eq!(record.attr("id").unwrap(), &json!("test"));
        assert_eq!(record.str_attr("id"), Some("test"));
        assert_eq!(record.attr("output").unwrap(), &Value::Null);
        assert!(record.has_attr("output"));
        assert!(!record.has_attr("something"));

        let err = record.attr("something").unwrap_err();
        assert_matches!(
            err,
            Error::NoSuchAttribute { record: "Prediction", ref name } if name == "something"
        );
        assert_eq!(err.to_string(), "undefined attribute `something` for Prediction");
    }

    #[test]
    fn test_non_object_document_has_no_attributes() {
        let record = Record::detached("ModelVersion", json!("v1"));
        assert_eq!(record.get("id"), None);
        assert!(record.attr("id").is_err());
    }

    #[test]
    fn test_data_is_shared_not_mutable() {
        let record = Record::detached("Model", json!({"nested": {"key": "value"}, "array": [1, 2]}));
        let mut handle = record.data_handle();
        assert!(Arc::get_mut(&mut handle).is_none());
        assert!(Arc::ptr_eq(&handle, &record.data_handle()));
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = Record::detached("Prediction", json!({"id": "p1", "status": "starting"}));
        let b = Record::detached("Prediction", json!({"status": "starting", "id": "p1"}));
        let c = Record::detached("Training", json!({"id": "p1", "status": "starting"}));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Record> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_debug_hides_document() {
        let record = Record::detached("Upload", json!({"upload_url": "https://secret"}));
        assert_eq!(format!("{record:?}"), "#<Upload @data={...}>");
        assert_eq!(record.to_string(), "#<Upload @data={...}>");
    }

    #[test]
    fn test_view_deserializes_document() {
        let record = Record::detached("Upload", json!({"serving_url": "https://x", "extra": 1}));
        let view: crate::types::UploadView = record.view().unwrap();
        assert_eq!(view.serving_url.as_deref(), Some("https://x"));
        assert_eq!(view.upload_url, None);
    }

    #[test]
    fn test_detached_record_has_no_client() {
        let record = Record::detached("Prediction", json!({}));
        assert_matches!(record.client(), Err(Error::Configuration { .. }));
    }
}
