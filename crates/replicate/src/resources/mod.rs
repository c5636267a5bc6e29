//! API resource operations
//!
//! Each submodule adds an `impl Client` block for one resource family. The
//! operations validate their arguments, call the right [`Endpoint`] and wrap
//! the returned documents as records.
//!
//! [`Endpoint`]: crate::http::Endpoint

mod models;
mod predictions;
mod trainings;
mod uploads;

use crate::error::{Error, Result};
use crate::http::ResponseBody;
use serde_json::{Map, Value};

/// Split a listing document into its `results` array and everything else.
pub(crate) fn split_results(body: ResponseBody, what: &str) -> Result<(Vec<Value>, Map<String, Value>)> {
    let mut document = match body.into_json() {
        Value::Object(document) => document,
        _ => return Err(unexpected_listing(what)),
    };
    match document.remove("results") {
        Some(Value::Array(results)) => Ok((results, document)),
        _ => Err(unexpected_listing(what)),
    }
}

fn unexpected_listing(what: &str) -> Error {
    Error::Api {
        message: format!("Unexpected response for {what}: missing results array"),
        status: None,
        body: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_split_results() {
        let body = ResponseBody::Json(json!({"results": [{"id": "a"}], "next": null}));
        let (results, rest) = split_results(body, "predictions").unwrap();
        assert_eq!(results, vec![json!({"id": "a"})]);
        assert_eq!(Value::Object(rest), json!({"next": null}));
    }

    #[test]
    fn test_split_results_rejects_other_shapes() {
        for body in [
            ResponseBody::Json(json!({"results": "nope"})),
            ResponseBody::Json(json!([1, 2])),
            ResponseBody::Text("oops".into()),
            ResponseBody::Empty,
        ] {
            assert_matches!(
                split_results(body, "model versions"),
                Err(Error::Api { status: None, .. })
            );
        }
    }
}
