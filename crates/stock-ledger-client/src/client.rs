//! Stock-ledger HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, ApplyBatchRequest, ApplyBatchResponse, BatchReason, BatchView,
    CreateProductRequest, CurrentStockView, MovementEntry, ProductView, ReverseBatchResponse,
    StockLevelView,
};

/// Header carrying the batch id over HTTP.
const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Stock-ledger API client.
///
/// Provides methods for submitting movement batches, reversing them, and
/// querying stock levels. Every write helper takes a caller-supplied batch id
/// so retried calls replay instead of double-applying.
#[derive(Debug, Clone)]
pub struct StockLedgerClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl StockLedgerClient {
    /// Create a new stock-ledger client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the stock-ledger service (e.g., `"http://stock-ledger:8080"`)
    /// * `api_key` - Service API key for authentication
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new stock-ledger client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_name: options.service_name,
        }
    }

    /// Record stock received against a purchase order.
    ///
    /// Use the purchase order id (or a derivative of it) as the batch id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn receive_purchase(
        &self,
        batch_id: &str,
        movements: Vec<MovementEntry>,
    ) -> Result<ApplyBatchResponse, ClientError> {
        self.apply_batch(batch_id, BatchReason::PurchaseReceived, movements)
            .await
    }

    /// Record stock shipped to fulfill a sales order.
    ///
    /// Deltas are negative for outgoing stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn fulfill_sale(
        &self,
        batch_id: &str,
        movements: Vec<MovementEntry>,
    ) -> Result<ApplyBatchResponse, ClientError> {
        self.apply_batch(batch_id, BatchReason::SaleFulfilled, movements)
            .await
    }

    /// Record stock sent back to a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn record_purchase_return(
        &self,
        batch_id: &str,
        movements: Vec<MovementEntry>,
    ) -> Result<ApplyBatchResponse, ClientError> {
        self.apply_batch(batch_id, BatchReason::PurchaseReturn, movements)
            .await
    }

    /// Record stock received back from a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn record_sale_return(
        &self,
        batch_id: &str,
        movements: Vec<MovementEntry>,
    ) -> Result<ApplyBatchResponse, ClientError> {
        self.apply_batch(batch_id, BatchReason::SaleReturn, movements)
            .await
    }

    /// Record a manual stock correction with an operator note.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn adjust_stock(
        &self,
        batch_id: &str,
        note: impl Into<String>,
        movements: Vec<MovementEntry>,
    ) -> Result<ApplyBatchResponse, ClientError> {
        self.apply_batch(
            batch_id,
            BatchReason::ManualAdjustment { note: note.into() },
            movements,
        )
        .await
    }

    /// Apply a movement batch.
    ///
    /// The batch id travels in the `Idempotency-Key` header; resubmitting the
    /// same id replays the stored result (`replayed: true`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn apply_batch(
        &self,
        batch_id: &str,
        reason: BatchReason,
        movements: Vec<MovementEntry>,
    ) -> Result<ApplyBatchResponse, ClientError> {
        let url = format!("{}/v1/stock/batches", self.base_url);
        let request = ApplyBatchRequest { reason, movements };

        tracing::debug!(batch_id, "Submitting stock batch");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .header(IDEMPOTENCY_KEY_HEADER, batch_id)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get an applied batch with its movements.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_batch(&self, batch_id: &str) -> Result<BatchView, ClientError> {
        let url = format!("{}/v1/stock/batches/{batch_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Reverse a previously applied batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the batch was never applied, or
    /// it has already been reversed.
    pub async fn reverse_batch(&self, batch_id: &str) -> Result<ReverseBatchResponse, ClientError> {
        let url = format!("{}/v1/stock/batches/{batch_id}/reverse", self.base_url);

        tracing::debug!(batch_id, "Reversing stock batch");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Register a new product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductView, ClientError> {
        let url = format!("{}/v1/products", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_product(&self, product_id: &str) -> Result<ProductView, ClientError> {
        let url = format!("{}/v1/products/{product_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List all registered products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_products(&self) -> Result<Vec<ProductView>, ClientError> {
        let url = format!("{}/v1/products", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List every product with its current stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn stock_levels(&self) -> Result<Vec<StockLevelView>, ClientError> {
        let url = format!("{}/v1/stock/levels", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List products at or below their low-stock threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn low_stock(&self, threshold: Option<i64>) -> Result<Vec<StockLevelView>, ClientError> {
        let mut url = format!("{}/v1/stock/levels/low", self.base_url);
        if let Some(threshold) = threshold {
            url.push_str(&format!("?threshold={threshold}"));
        }

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current stock for one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn current_stock(&self, product_id: &str) -> Result<CurrentStockView, ClientError> {
        let url = format!("{}/v1/stock/levels/{product_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;
                let detail = |key: &str| {
                    api_error
                        .error
                        .details
                        .as_ref()
                        .and_then(|d| d.get(key))
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };

                // Map specific error codes to typed errors
                match code {
                    "unknown_product" => Err(ClientError::UnknownProduct {
                        product_id: detail("product_id"),
                    }),
                    "empty_batch" => Err(ClientError::EmptyBatch),
                    "batch_not_found" => Err(ClientError::BatchNotFound {
                        batch_id: detail("batch_id"),
                    }),
                    "already_reversed" => Err(ClientError::AlreadyReversed {
                        batch_id: detail("batch_id"),
                        reversed_by: detail("reversed_by"),
                    }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Service name to include in requests.
    pub service_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a service name.
    #[must_use]
    pub fn with_service_name(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = StockLedgerClient::new("http://localhost:8080", "test-api-key");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = StockLedgerClient::new("http://localhost:8080/", "test-api-key");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_options() {
        let options = ClientOptions::with_service_name("purchasing");
        let client = StockLedgerClient::with_options("http://localhost:8080", "key", options);
        assert_eq!(client.service_name, "purchasing");
    }
}
