//! Common test utilities for stock-ledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use stock_ledger_service::{create_router, AppState, ServiceConfig};
use stock_ledger_store::RocksLedgerStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The service API key for authenticated requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksLedgerStore::open(temp_dir.path()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            low_stock_default_threshold: 10,
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            service_api_key,
        }
    }

    /// Register a product and return its id.
    pub async fn create_product(&self, sku: &str, threshold: Option<i64>) -> String {
        let response = self
            .server
            .post("/v1/products")
            .add_header("x-api-key", &self.service_api_key)
            .json(&serde_json::json!({
                "sku": sku,
                "name": format!("Product {sku}"),
                "low_stock_threshold": threshold,
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["id"].as_str().expect("product id").to_string()
    }

    /// Apply a single-product batch and return the response body.
    pub async fn apply_batch(
        &self,
        batch_id: &str,
        product_id: &str,
        quantity_delta: i64,
        reason: serde_json::Value,
    ) -> serde_json::Value {
        let response = self
            .server
            .post("/v1/stock/batches")
            .add_header("x-api-key", &self.service_api_key)
            .add_header("idempotency-key", batch_id)
            .json(&serde_json::json!({
                "reason": reason,
                "movements": [
                    { "product_id": product_id, "quantity_delta": quantity_delta }
                ]
            }))
            .await;

        response.assert_status_ok();
        response.json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
