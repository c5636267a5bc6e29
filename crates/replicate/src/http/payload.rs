//! Request payloads
//!
//! A [`Payload`] is a JSON object plus zero or more file parts. Payloads without
//! files are sent as JSON; payloads with files are sent as `multipart/form-data`.

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

/// A file attached to a multipart payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// File contents
    pub bytes: Bytes,
    /// File name reported to the server
    pub filename: String,
    /// MIME type, `application/octet-stream` when unset
    pub mime: Option<String>,
}

impl FilePart {
    /// Create a file part from in-memory bytes.
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime: None,
        }
    }

    /// Set the MIME type.
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Body of a POST/PUT/PATCH request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
    files: Vec<(String, FilePart)>,
}

impl Payload {
    /// An empty payload, sent as `{}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from a JSON value.
    ///
    /// `null` yields an empty payload; anything other than an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(fields) => Ok(Self {
                fields,
                files: Vec::new(),
            }),
            other => Err(Error::Validation(format!(
                "Request payload must be a JSON object, got {other}"
            ))),
        }
    }

    /// Serialize any value into a payload.
    pub fn from_serializable<T: serde::Serialize>(value: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Add or replace a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach a file under `name`.
    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.files.push((name.into(), part));
        self
    }

    /// JSON fields of this payload.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Whether this payload must be sent as multipart.
    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty()
    }

    /// Encode the JSON fields.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.fields)?)
    }

    /// Build a fresh multipart form.
    ///
    /// Forms are consumed by sending, so this is called once per attempt.
    pub fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (key, value) in &self.fields {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form = form.text(key.clone(), text);
        }
        for (name, file) in &self.files {
            let mime = file.mime.as_deref().unwrap_or("application/octet-stream");
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.filename.clone())
                .mime_str(mime)
                .map_err(|e| Error::Validation(format!("Invalid MIME type '{mime}': {e}")))?;
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

impl TryFrom<Value> for Payload {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payload_encodes_as_empty_object() {
        let payload = Payload::new();
        assert!(!payload.is_multipart());
        assert_eq!(payload.to_json_bytes().unwrap(), b"{}");
    }

    #[test]
    fn test_null_value_is_empty_payload() {
        assert_eq!(Payload::from_value(Value::Null).unwrap(), Payload::new());
    }

    #[test]
    fn test_non_object_rejected() {
        let err = Payload::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_file_makes_payload_multipart() {
        let payload = Payload::from_value(json!({"caption": "hi"}))
            .unwrap()
            .file("image", FilePart::new(vec![1u8, 2, 3], "a.png").mime("image/png"));
        assert!(payload.is_multipart());
        assert!(payload.to_form().is_ok());
    }

    #[test]
    fn test_invalid_mime_rejected() {
        let payload = Payload::new().file("f", FilePart::new(vec![0u8], "x").mime("not a mime"));
        assert!(payload.to_form().is_err());
    }
}
