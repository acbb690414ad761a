//! Offline queue flow tests
//!
//! The manager runs on the SQLite queue and talks to wiremock, so these cover
//! the whole agent path from capture to drain.

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::{agent_config, sample_draft, TestQueue};
use price_survey::client::api_client::HttpSurveyApi;
use price_survey::client::local_db::LocalDatabase;
use price_survey::client::offline::{FailureReason, OfflineError, OfflineManager, SubmitOutcome};
use price_survey::client::sync::ConnectivityMonitor;
use price_survey::shared::api::IDEMPOTENCY_KEY_HEADER;

fn manager(server: &MockServer, queue: &TestQueue, db: LocalDatabase, online: bool) -> Arc<OfflineManager> {
    let config = agent_config(&server.uri(), queue.dir.path());
    Arc::new(OfflineManager::new(
        Arc::new(db),
        Arc::new(HttpSurveyApi::new(config.clone())),
        ConnectivityMonitor::new(online),
        config.app(),
    ))
}

async fn mount_create(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/submissions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn create_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/api/submissions")
        .collect()
}

fn outlet_of(request: &Request) -> String {
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    body["outletName"].as_str().unwrap_or_default().to_string()
}

fn idempotency_key(request: &Request) -> String {
    request
        .headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_offline_capture_then_drain_in_order() {
    let server = MockServer::start().await;
    mount_create(&server, 201, json!({ "ok": true, "id": "srv" })).await;
    let queue = TestQueue::new().await;
    let manager = manager(&server, &queue, queue.db.clone(), false);

    for outlet in ["Kiosk A", "Kiosk B", "Kiosk C"] {
        let outcome = manager.submit(sample_draft(outlet)).await.unwrap();
        assert_matches!(outcome, SubmitOutcome::Queued { .. });
    }
    assert!(create_requests(&server).await.is_empty());
    assert_matches!(manager.drain_all().await, Err(OfflineError::Offline));
    assert_eq!(manager.pending_count().await.unwrap(), 3);

    manager.connectivity().set_online(true);
    let report = manager.drain_all().await.unwrap();

    assert_eq!(report.success_count, 3);
    assert_eq!(report.failed_count, 0);
    assert_eq!(manager.pending_count().await.unwrap(), 0);
    let outlets: Vec<String> = create_requests(&server).await.iter().map(outlet_of).collect();
    assert_eq!(outlets, vec!["Kiosk A", "Kiosk B", "Kiosk C"]);
}

#[tokio::test]
async fn test_queue_survives_restart() {
    let server = MockServer::start().await;
    mount_create(&server, 201, json!({ "ok": true, "id": "srv" })).await;
    let queue = TestQueue::new().await;

    {
        let offline = manager(&server, &queue, queue.db.clone(), false);
        offline.submit(sample_draft("Kiosk A")).await.unwrap();
        offline.submit(sample_draft("Kiosk B")).await.unwrap();
    }

    let restarted = manager(&server, &queue, queue.reopen().await, true);
    let pending = restarted.pending().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].draft, sample_draft("Kiosk A").normalized());

    let report = restarted.drain_all().await.unwrap();
    assert_eq!(report.success_count, 2);
    assert_eq!(restarted.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_retry_reuses_idempotency_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/submissions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "ok": false, "error": "maintenance" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_create(&server, 201, json!({ "ok": true, "id": "srv" })).await;

    let queue = TestQueue::new().await;
    let manager = manager(&server, &queue, queue.db.clone(), true);

    let outcome = manager.submit(sample_draft("Kiosk A")).await.unwrap();
    let pending_id = match outcome {
        SubmitOutcome::Queued { pending_id } => pending_id,
        other => panic!("expected the failed submission to be queued, got {:?}", other),
    };

    let report = manager.drain_all().await.unwrap();
    assert_eq!(report.success_count, 1);

    let keys: Vec<String> = create_requests(&server).await.iter().map(idempotency_key).collect();
    assert_eq!(keys, vec![pending_id.clone(), pending_id]);
}

#[tokio::test]
async fn test_retries_exhausted_after_three_drains() {
    let server = MockServer::start().await;
    mount_create(&server, 500, json!({ "ok": false, "error": "Server error" })).await;
    let queue = TestQueue::new().await;
    let manager = manager(&server, &queue, queue.db.clone(), false);
    manager.submit(sample_draft("Kiosk A")).await.unwrap();
    manager.connectivity().set_online(true);

    for attempt in 1..=2u32 {
        let report = manager.drain_all().await.unwrap();
        assert_eq!(report.failed_count, 1);
        assert!(report.permanent_failures.is_empty());
        let pending = manager.pending().await.unwrap();
        assert_eq!(pending[0].retry_count, attempt);
        assert!(pending[0].last_error.as_deref().unwrap_or_default().contains("500"));
    }

    let report = manager.drain_all().await.unwrap();
    assert_eq!(report.permanent_failures.len(), 1);
    assert_matches!(
        report.permanent_failures[0].reason,
        FailureReason::RetriesExhausted { attempts: 3, .. }
    );
    assert_eq!(manager.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_server_validation_drops_record() {
    let server = MockServer::start().await;
    mount_create(
        &server,
        400,
        json!({
            "ok": false,
            "code": "VALIDATION_ERROR",
            "errors": [{ "field": "area", "message": "Area must be at least 2 characters" }]
        }),
    )
    .await;
    let queue = TestQueue::new().await;
    let manager = manager(&server, &queue, queue.db.clone(), false);
    manager.submit(sample_draft("Kiosk A")).await.unwrap();
    manager.connectivity().set_online(true);

    let report = manager.drain_all().await.unwrap();

    assert_eq!(report.failed_count, 1);
    assert_eq!(report.permanent_failures.len(), 1);
    assert_eq!(report.permanent_failures[0].outlet_name, "Kiosk A");
    assert_matches!(
        report.permanent_failures[0].reason,
        FailureReason::ValidationRejected { .. }
    );
    assert_eq!(manager.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_counts_as_delivered() {
    let server = MockServer::start().await;
    mount_create(&server, 409, json!({ "ok": false, "code": "DUPLICATE", "message": "Already captured for this outlet today" })).await;
    let queue = TestQueue::new().await;
    let manager = manager(&server, &queue, queue.db.clone(), true);

    assert_eq!(
        manager.submit(sample_draft("Kiosk A")).await.unwrap(),
        SubmitOutcome::AlreadyCaptured
    );
    assert_eq!(manager.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reconnect_triggers_auto_drain() {
    let server = MockServer::start().await;
    mount_create(&server, 201, json!({ "ok": true, "id": "srv" })).await;
    let queue = TestQueue::new().await;
    let manager = manager(&server, &queue, queue.db.clone(), false);
    manager.submit(sample_draft("Kiosk A")).await.unwrap();
    manager.submit(sample_draft("Kiosk B")).await.unwrap();

    let mut reports = manager.subscribe_reports();
    let task = manager.spawn_auto_drain();
    manager.connectivity().set_online(true);

    let report = tokio::time::timeout(Duration::from_secs(5), reports.recv())
        .await
        .expect("auto drain did not run")
        .unwrap();
    assert_eq!(report.success_count, 2);
    assert_eq!(manager.pending_count().await.unwrap(), 0);

    task.abort();
}
