//! Agent against a live server
//!
//! Binds the real router on a loopback port and runs the agent's HTTP client
//! and offline manager against it.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use crate::common::{agent_config, sample_draft, TestQueue};
use price_survey::backend::create_app;
use price_survey::backend::server::load_database;
use price_survey::client::api_client::HttpSurveyApi;
use price_survey::client::offline::{OfflineManager, SubmitOutcome};
use price_survey::client::sync::ConnectivityMonitor;

/// Serve a fresh in-memory backend and return its base URL
async fn spawn_server() -> String {
    let pool = load_database("sqlite::memory:").await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app(pool)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_queue_drains_into_live_server() {
    let url = spawn_server().await;
    let queue = TestQueue::new().await;
    let config = agent_config(&url, queue.dir.path());
    let api = HttpSurveyApi::new(config.clone());
    assert!(api.probe().await);

    let manager = Arc::new(OfflineManager::new(
        Arc::new(queue.db.clone()),
        Arc::new(api),
        ConnectivityMonitor::new(false),
        config.app(),
    ));

    manager.submit(sample_draft("Kiosk A")).await.unwrap();
    manager.submit(sample_draft("Kiosk B")).await.unwrap();
    // Captured twice while offline; the server keeps the first.
    manager.submit(sample_draft("Kiosk A")).await.unwrap();

    manager.connectivity().set_online(true);
    let report = manager.drain_all().await.unwrap();

    assert_eq!(report.success_count, 3);
    assert!(report.permanent_failures.is_empty());
    assert_eq!(manager.pending_count().await.unwrap(), 0);

    let listing: serde_json::Value = reqwest::get(format!("{}/api/submissions", url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["total"], 2);
}

#[tokio::test]
async fn test_direct_submit_and_duplicate() {
    let url = spawn_server().await;
    let queue = TestQueue::new().await;
    let config = agent_config(&url, queue.dir.path());
    let manager = OfflineManager::new(
        Arc::new(queue.db.clone()),
        Arc::new(HttpSurveyApi::new(config.clone())),
        ConnectivityMonitor::new(true),
        config.app(),
    );

    let first = manager.submit(sample_draft("Mama Put")).await.unwrap();
    assert!(matches!(first, SubmitOutcome::Delivered { id: Some(_) }));

    let second = manager.submit(sample_draft("Mama Put")).await.unwrap();
    assert_eq!(second, SubmitOutcome::AlreadyCaptured);
    assert_eq!(manager.pending_count().await.unwrap(), 0);
}
