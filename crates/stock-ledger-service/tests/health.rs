//! Health endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "stock-ledger");
}

#[tokio::test]
async fn health_check_requires_no_auth() {
    let harness = TestHarness::new();

    // No x-api-key header at all
    let response = harness.server.get("/health").await;
    response.assert_status_ok();
}
