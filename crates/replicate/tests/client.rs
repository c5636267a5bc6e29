//! Integration tests for resource operations using wiremock
//!
//! These exercise the client end to end: validation, endpoint selection,
//! caching and record follow-up calls.

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use replicate::prelude::*;
use replicate::types::ModelLookup;
use replicate::{ClientConfig, NotFoundKind};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model_json() -> serde_json::Value {
    json!({
        "owner": "stability-ai",
        "name": "sdxl",
        "visibility": "public",
        "latest_version": {"id": "v2", "created_at": "2024-02-01T00:00:00Z"},
    })
}

#[tokio::test]
async fn test_retrieve_model_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/stability-ai/sdxl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let first = client.retrieve_model("stability-ai/sdxl").await.unwrap();
    let second = client.retrieve_model("stability-ai/sdxl").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.identifier(), "stability-ai/sdxl");
    assert_eq!(first.latest_version().unwrap().id(), Some("v2"));
    assert!(Arc::ptr_eq(
        &first.record().data_handle(),
        &second.record().data_handle()
    ));
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/stability-ai/sdxl/versions/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "v1"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    client
        .retrieve_model_version("stability-ai/sdxl", "v1")
        .await
        .unwrap();
    client
        .retrieve_model_version("stability-ai/sdxl", "v1")
        .await
        .unwrap();
    client.clear_cache();
    let version = client
        .retrieve_model_with("stability-ai/sdxl", "v1")
        .await
        .unwrap()
        .into_version()
        .unwrap();
    assert_eq!(version.id(), Some("v1"));
}

#[tokio::test]
async fn test_all_versions_never_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/stability-ai/sdxl/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "previous": null,
            "results": [{"id": "v2"}, {"id": "v1"}],
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    for _ in 0..2 {
        let lookup = client
            .retrieve_model_with("stability-ai/sdxl", "all")
            .await
            .unwrap();
        assert_matches!(lookup, ModelLookup::Versions(ref versions) if versions.len() == 2);
    }
}

#[tokio::test]
async fn test_model_versions_memoized_per_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/stability-ai/sdxl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models/stability-ai/sdxl/versions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": "v2"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let model = client.retrieve_model("stability-ai/sdxl").await.unwrap();
    let first = model.versions().await.unwrap();
    let second = model.versions().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first[0].id(), Some("v2"));
}

#[tokio::test]
async fn test_prediction_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(body_json(json!({"version": "v2", "input": {"prompt": "a cat", "steps": 20}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1",
            "status": "starting",
            "created_at": "2024-03-01T00:00:00Z",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "status": "succeeded",
            "output": ["https://replicate.delivery/out.png"],
            "created_at": "2024-03-01T00:00:00Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let version = replicate::ModelVersion::detached(json!({"id": "v2"}));
    assert!(version.predict(json!({}), None).await.is_err());

    let mut prediction = client
        .create_prediction(CreatePredictionParams::new(
            "v2",
            json!({"prompt": "a cat", "steps": 20}),
        ))
        .await
        .unwrap();
    assert!(prediction.is_starting());
    assert_eq!(prediction.status(), Some(Status::Starting));

    let before = prediction.record().data_handle();
    prediction.refetch().await.unwrap();

    assert!(prediction.is_succeeded());
    assert!(prediction.is_finished());
    assert_eq!(
        prediction.output(),
        Some(&json!(["https://replicate.delivery/out.png"]))
    );
    assert!(!Arc::ptr_eq(&before, &prediction.record().data_handle()));
    assert_eq!(before["status"], "starting");
}

#[tokio::test]
async fn test_model_version_predict_uses_owning_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/stability-ai/sdxl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(body_partial_json(json!({
            "version": "v2",
            "webhook": "https://example.com/mine",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p9", "status": "starting"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let model = client.retrieve_model("stability-ai/sdxl").await.unwrap();
    let prediction = model
        .latest_version()
        .unwrap()
        .predict(json!({"prompt": "a cat"}), Some("https://example.com/mine"))
        .await
        .unwrap();
    assert_eq!(prediction.id(), Some("p9"));
}

#[tokio::test]
async fn test_default_webhook_injected_only_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(body_partial_json(json!({"webhook": "https://example.com/default"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(body_partial_json(json!({"webhook": "https://example.com/mine"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .api_token(common::TEST_TOKEN)
        .api_base_url(common::api_base(&server))
        .webhook_url("https://example.com/default")
        .retry(common::fast_retry())
        .build()
        .unwrap();

    let injected = client
        .create_prediction(CreatePredictionParams::new("v1", json!({})))
        .await
        .unwrap();
    assert_eq!(injected.id(), Some("p1"));

    let explicit = client
        .create_prediction(
            CreatePredictionParams::new("v1", json!({})).webhook("https://example.com/mine"),
        )
        .await
        .unwrap();
    assert_eq!(explicit.id(), Some("p2"));
}

#[tokio::test]
async fn test_create_prediction_retried_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"detail": "Too many requests"})),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .and(body_partial_json(json!({"version": "v1", "input": {"prompt": "a cat"}})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "p1", "status": "starting"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let prediction = client
        .create_prediction(CreatePredictionParams::new("v1", json!({"prompt": "a cat"})))
        .await
        .unwrap();

    assert_eq!(prediction.id(), Some("p1"));
    assert!(prediction.is_starting());
    assert_eq!(
        client.api_endpoint().unwrap().last_response().unwrap().retries_taken,
        2
    );
}

#[tokio::test]
async fn test_cancel_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions/p1/cancel"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "p1", "status": "canceled"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let mut prediction = Prediction::detached(json!({"id": "p1", "status": "processing"}));
    assert!(prediction.cancel().await.is_err());
    assert!(prediction.is_processing());

    let canceled = client.cancel_prediction("p1").await.unwrap();
    assert!(canceled.is_canceled());
    assert_eq!(canceled.status_description(), "Canceled");
}

#[tokio::test]
async fn test_refetch_failure_keeps_previous_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "p1", "status": "processing"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions/p1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let mut prediction = client
        .create_prediction(CreatePredictionParams::new("v1", json!({})))
        .await
        .unwrap();
    let before = prediction.record().data_handle();

    let err = prediction.refetch().await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert!(prediction.is_processing());
    assert!(Arc::ptr_eq(&before, &prediction.record().data_handle()));
}

#[tokio::test]
async fn test_list_predictions_pages() {
    let server = MockServer::start().await;
    let next = format!("{}/v1/predictions?cursor=cD0y", server.uri());
    Mock::given(method("GET"))
        .and(path("/v1/predictions"))
        .and(query_param("cursor", "cD0y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": null,
            "previous": null,
            "results": [{"id": "p3"}],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": next,
            "previous": null,
            "results": [{"id": "p1"}, {"id": "p2"}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let page = client.list_predictions(None).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.next(), Some(next.as_str()));
    assert_eq!(page.metadata.get("previous"), Some(&serde_json::Value::Null));

    let cursor = page.next_cursor().unwrap();
    let page = client.list_predictions(Some(&cursor)).await.unwrap();
    let ids: Vec<_> = page
        .into_iter()
        .map(|p| p.id().map(str::to_string))
        .collect();
    assert_eq!(ids, vec![Some("p3".to_string())]);
}

#[tokio::test]
async fn test_training_uses_training_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dreambooth/v1/trainings"))
        .and(body_partial_json(json!({
            "model": "me/my-model",
            "input": {"instance_prompt": "zwx dog"},
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "t1",
            "status": "starting",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dreambooth/v1/trainings/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "status": "succeeded",
            "version": "v-trained",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let mut training = client
        .create_training(CreateTrainingParams::new(
            "me/my-model",
            json!({"instance_prompt": "zwx dog"}),
        ))
        .await
        .unwrap();
    assert!(training.is_running());
    assert!(training.version().is_none());

    training.refetch().await.unwrap();
    assert!(training.is_succeeded());
    assert_eq!(training.version().unwrap().id(), Some("v-trained"));
}

#[tokio::test]
async fn test_not_found_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let err = client.retrieve_model("a/b").await.unwrap_err();
    assert_eq!(err.not_found_kind(), Some(NotFoundKind::Model));

    let err = client.retrieve_model_version("a/b", "v1").await.unwrap_err();
    assert_eq!(err.not_found_kind(), Some(NotFoundKind::Version));

    let err = client.retrieve_prediction("p1").await.unwrap_err();
    assert_eq!(err.to_string(), "Prediction not found (404): Not found.");
}

#[tokio::test]
async fn test_missing_token_checked_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = ClientConfig::default();
    config.api_base_url = common::api_base(&server);
    let client = Client::from_config(config).unwrap();

    let err = client.retrieve_model("a/b").await.unwrap_err();
    assert_matches!(err, Error::Configuration { ref suggestion, .. } if suggestion.is_some());
}

#[tokio::test]
async fn test_retrieve_collection_returns_raw_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/collections/super-resolution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "slug": "super-resolution",
            "models": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    let collection = client
        .retrieve_collection("super-resolution")
        .await
        .unwrap();
    assert_eq!(collection["slug"], "super-resolution");
}
