//! HTTP client tests
//!
//! Checks what [`HttpSurveyApi`] sends and how it reports each kind of answer.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{agent_config, sample_draft};
use price_survey::client::api_client::{HttpSurveyApi, SurveyApi};
use price_survey::shared::api::{VerifyRequest, CODE_DUPLICATE};
use price_survey::shared::ProductName;

fn client(server: &MockServer) -> (HttpSurveyApi, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let api = HttpSurveyApi::new(agent_config(&server.uri(), dir.path()));
    (api, dir)
}

#[tokio::test]
async fn test_create_sends_idempotency_key_and_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submissions"))
        .and(header("Idempotency-Key", "pending_1760000000000_abcdef012"))
        .and(body_partial_json(json!({
            "outletName": "Mama Put",
            "customerPhone": "08031234567",
            "collectedAt": "2026-10-16T09:00:00+01:00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true, "id": "srv-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let (api, _dir) = client(&server);
    let reply = api
        .create_submission("pending_1760000000000_abcdef012", &sample_draft("Mama Put"))
        .await
        .unwrap();

    assert_eq!(reply.status, 201);
    assert_eq!(reply.body.id.as_deref(), Some("srv-1"));
}

#[tokio::test]
async fn test_create_reports_duplicate_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submissions"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "ok": false,
            "code": "DUPLICATE",
            "message": "Already captured for this outlet today"
        })))
        .mount(&server)
        .await;

    let (api, _dir) = client(&server);
    let reply = api.create_submission("k", &sample_draft("Mama Put")).await.unwrap();

    assert_eq!(reply.status, 409);
    assert_eq!(reply.body.code.as_deref(), Some(CODE_DUPLICATE));
    assert_eq!(reply.body.describe(), "Already captured for this outlet today");
}

#[tokio::test]
async fn test_create_keeps_non_json_body_readable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submissions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (api, _dir) = client(&server);
    let reply = api.create_submission("k", &sample_draft("Mama Put")).await.unwrap();

    assert_eq!(reply.status, 502);
    assert!(!reply.body.ok);
    assert!(reply.body.describe().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_create_unreachable_server_is_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let api = HttpSurveyApi::new(agent_config("http://127.0.0.1:9", dir.path()));

    let err = api.create_submission("k", &sample_draft("Mama Put")).await.unwrap_err();
    assert!(!err.is_secure_channel_failure(), "{}", err);
}

#[tokio::test]
async fn test_verify_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submissions/verify"))
        .and(body_partial_json(json!({ "outletName": "Mama Put", "day": "2026-10-16" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "exists": true,
            "id": "srv-9"
        })))
        .mount(&server)
        .await;

    let (api, _dir) = client(&server);
    let response = api
        .verify_submission(&VerifyRequest {
            outlet_name: "Mama Put".to_string(),
            day: "2026-10-16".to_string(),
        })
        .await
        .unwrap();

    assert!(response.exists);
    assert_eq!(response.id.as_deref(), Some("srv-9"));
}

#[tokio::test]
async fn test_verify_server_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submissions/verify"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (api, _dir) = client(&server);
    let err = api
        .verify_submission(&VerifyRequest {
            outlet_name: "Mama Put".to_string(),
            day: "2026-10-16".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.message().contains("500"));
}

#[tokio::test]
async fn test_products_and_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": ["SBC 40cl", "NBC 40cl", "RC Cola 40cl", "Pop Cola 40cl", "Bigi 40cl"]
        })))
        .mount(&server)
        .await;

    let (api, _dir) = client(&server);
    let catalogue = api.fetch_products().await.unwrap();
    assert_eq!(catalogue.items, ProductName::ALL.to_vec());
    assert!(api.probe().await);

    let dir = tempfile::tempdir().unwrap();
    let offline = HttpSurveyApi::new(agent_config("http://127.0.0.1:9", dir.path()));
    assert!(!offline.probe().await);
}
