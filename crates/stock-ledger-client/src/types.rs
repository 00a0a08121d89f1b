//! Request and response types for the stock-ledger client.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stock_ledger_core::MovementReason;

/// One movement in a batch request.
#[derive(Debug, Clone, Serialize)]
pub struct MovementEntry {
    /// The product whose stock changes.
    pub product_id: String,
    /// Signed change in stock.
    pub quantity_delta: i64,
}

impl MovementEntry {
    /// Create a movement entry.
    #[must_use]
    pub fn new(product_id: impl Into<String>, quantity_delta: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity_delta,
        }
    }
}

/// The reason of a submitted batch.
///
/// Reversals are not submitted directly; use
/// [`reverse_batch`](crate::StockLedgerClient::reverse_batch) instead.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchReason {
    /// Stock received against a purchase order.
    PurchaseReceived,
    /// Stock shipped to fulfill a sale.
    SaleFulfilled,
    /// A manual stock correction.
    ManualAdjustment {
        /// Operator-supplied reason.
        note: String,
    },
    /// Stock sent back to a supplier.
    PurchaseReturn,
    /// Stock received back from a customer.
    SaleReturn,
}

/// Apply-batch request body.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyBatchRequest {
    /// Why the batch is being applied.
    pub reason: BatchReason,
    /// The movements to apply together.
    pub movements: Vec<MovementEntry>,
}

/// Apply-batch response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyBatchResponse {
    /// The batch id that was applied.
    pub batch_id: String,
    /// True when this call was an idempotent replay of an earlier commit.
    pub replayed: bool,
    /// Stock per affected product as of the batch's commit.
    pub stock_after: HashMap<String, i64>,
}

/// Reverse-batch response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseBatchResponse {
    /// The id of the reversing batch.
    pub batch_id: String,
    /// The batch that was reversed.
    pub reverses: String,
    /// Stock per affected product after the reversal.
    pub stock_after: HashMap<String, i64>,
}

/// One movement in a batch lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct MovementView {
    /// Movement id.
    pub id: String,
    /// The product whose stock changed.
    pub product_id: String,
    /// Signed change in stock.
    pub quantity_delta: i64,
    /// When the movement was written.
    pub created_at: DateTime<Utc>,
}

/// Batch lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchView {
    /// The batch id.
    pub batch_id: String,
    /// Why the batch was applied.
    pub reason: MovementReason,
    /// When the batch committed.
    pub applied_at: DateTime<Utc>,
    /// The movements written by the batch.
    pub movements: Vec<MovementView>,
    /// Stock per affected product as of the commit.
    pub stock_after: HashMap<String, i64>,
}

/// Create-product request body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProductRequest {
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Low-stock alert threshold (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}

/// Product response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductView {
    /// Product ID.
    pub id: String,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Low-stock alert threshold, if configured.
    pub low_stock_threshold: Option<i64>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Stock level response.
#[derive(Debug, Clone, Deserialize)]
pub struct StockLevelView {
    /// Product ID.
    pub product_id: String,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Current stock. Negative values mean oversold stock.
    pub current_stock: i64,
    /// The product's configured alert threshold, if any.
    pub low_stock_threshold: Option<i64>,
}

/// Single-product stock response.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentStockView {
    /// Product ID.
    pub product_id: String,
    /// Current stock.
    pub current_stock: i64,
}

/// API error response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional error details.
    pub details: Option<serde_json::Value>,
}
