//! Input validation for resource operations
//!
//! Every check here runs before a request is built, so a failure never costs
//! a network round trip.

use crate::error::{Error, Result};
use crate::observability::log_validation_error;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use url::Url;

static MODEL_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("model identifier pattern compiles")
});

static COLLECTION_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("collection slug pattern compiles"));

fn fail(field: &str, message: &str) -> Error {
    log_validation_error(field, message);
    Error::Validation(message.to_string())
}

/// Validate an `owner/name` model identifier.
pub fn validate_model_identifier(identifier: &str) -> Result<()> {
    if identifier.trim().is_empty() {
        return Err(fail("model", "Model identifier must be a non-empty string"));
    }
    if !MODEL_IDENTIFIER.is_match(identifier)
        || identifier.split('/').any(|segment| segment == "." || segment == "..")
    {
        return Err(fail("model", "Model identifier must be in format 'owner/name'"));
    }
    Ok(())
}

/// Validate a collection slug.
pub fn validate_collection_slug(slug: &str) -> Result<()> {
    if slug.trim().is_empty() {
        return Err(fail("slug", "Collection slug must be a non-empty string"));
    }
    if !COLLECTION_SLUG.is_match(slug) {
        return Err(fail("slug", "Collection slug contains invalid characters"));
    }
    Ok(())
}

/// Validate a prediction id.
pub fn validate_prediction_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(fail("id", "Prediction ID must be a non-empty string"));
    }
    Ok(())
}

/// Validate a training id.
pub fn validate_training_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(fail("id", "Training ID must be a non-empty string"));
    }
    Ok(())
}

/// Validate a prediction's model version.
pub fn validate_version(version: &str) -> Result<()> {
    if version.trim().is_empty() {
        return Err(fail("version", "Version parameter must be a non-empty string"));
    }
    Ok(())
}

/// Validate a webhook URL: it must parse with an http(s) scheme and a host.
pub fn validate_webhook_url(webhook: &str) -> Result<()> {
    let valid = Url::parse(webhook.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false);
    if !valid {
        return Err(fail("webhook", "Webhook URL must be a valid URL"));
    }
    Ok(())
}

/// Require prediction input to be a JSON object and return its fields.
///
/// Value coercion is carried by [`Value`] itself: every field is already a
/// string, number, boolean, null, nested object or array, so the fields are
/// sent unchanged.
pub fn normalize_input(input: Value) -> Result<Map<String, Value>> {
    match input {
        Value::Object(map) => Ok(map),
        _ => Err(fail("input", "Input parameter must be a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn message(result: Result<()>) -> String {
        match result {
            Err(Error::Validation(message)) => message,
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("stability-ai/stable-diffusion")]
    #[case("owner_1/model.v2")]
    #[case("a/b")]
    #[case("owner/.hidden")]
    fn test_valid_model_identifiers(#[case] identifier: &str) {
        assert!(validate_model_identifier(identifier).is_ok());
    }

    #[rstest]
    #[case("", "Model identifier must be a non-empty string")]
    #[case("   ", "Model identifier must be a non-empty string")]
    #[case("no-slash", "Model identifier must be in format 'owner/name'")]
    #[case("a/b/c", "Model identifier must be in format 'owner/name'")]
    #[case("owner/na me", "Model identifier must be in format 'owner/name'")]
    #[case("../etc", "Model identifier must be in format 'owner/name'")]
    #[case("owner/..", "Model identifier must be in format 'owner/name'")]
    #[case("./model", "Model identifier must be in format 'owner/name'")]
    fn test_invalid_model_identifiers(#[case] identifier: &str, #[case] expected: &str) {
        assert_eq!(message(validate_model_identifier(identifier)), expected);
    }

    #[test]
    fn test_collection_slug() {
        assert!(validate_collection_slug("text-to-image").is_ok());
        assert_eq!(
            message(validate_collection_slug("")),
            "Collection slug must be a non-empty string"
        );
        assert_eq!(
            message(validate_collection_slug("a/b")),
            "Collection slug contains invalid characters"
        );
    }

    #[test]
    fn test_ids_and_version() {
        assert!(validate_prediction_id("p1").is_ok());
        assert_eq!(
            message(validate_prediction_id(" ")),
            "Prediction ID must be a non-empty string"
        );
        assert_eq!(
            message(validate_version("")),
            "Version parameter must be a non-empty string"
        );
        assert!(validate_training_id("").is_err());
    }

    #[rstest]
    #[case("https://example.com/hook", true)]
    #[case("http://localhost:3000/hook", true)]
    #[case("  https://example.com/hook  ", true)]
    #[case("example.com/hook", false)]
    #[case("mailto:someone@example.com", false)]
    #[case("", false)]
    fn test_webhook_urls(#[case] webhook: &str, #[case] valid: bool) {
        assert_eq!(validate_webhook_url(webhook).is_ok(), valid);
    }

    #[test]
    fn test_normalize_input_requires_object() {
        assert!(normalize_input(json!("a cat")).is_err());
        assert!(normalize_input(json!(["a"])).is_err());
        assert!(normalize_input(Value::Null).is_err());
    }

    #[test]
    fn test_normalize_input_preserves_nested_values() {
        let input = json!({
            "prompt": "a cat",
            "steps": 50,
            "guidance": 7.5,
            "hd": true,
            "nested": {"tags": ["x", 1, false]},
        });
        let normalized = normalize_input(input.clone()).unwrap();
        assert_eq!(Value::Object(normalized), input);
    }
}
