//! Stock batch and query handlers.
//!
//! Batch submission maps 1:1 to `AdjustmentEngine::apply_batch`; the batch id
//! is taken from the `Idempotency-Key` header when present, falling back to
//! `batch_id` in the body. Reversal maps to
//! `ReversalCoordinator::reverse_batch`. Read endpoints map to the
//! `StockQuery` facade.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use stock_ledger_core::{BatchId, MovementInput, MovementReason, ProductId, StockMovement};
use stock_ledger_engine::{AppliedBatch, StockLevel};
use stock_ledger_store::LedgerStore;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the batch id over HTTP.
const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// ============================================================================
// Request / response types
// ============================================================================

/// The reason of a submitted batch.
///
/// Reversal batches cannot be submitted directly; deleting a business record
/// goes through the reverse endpoint so undo logic stays on one code path.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReasonRequest {
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

impl From<ReasonRequest> for MovementReason {
    fn from(reason: ReasonRequest) -> Self {
        match reason {
            ReasonRequest::PurchaseReceived => Self::PurchaseReceived,
            ReasonRequest::SaleFulfilled => Self::SaleFulfilled,
            ReasonRequest::ManualAdjustment { note } => Self::ManualAdjustment { note },
            ReasonRequest::PurchaseReturn => Self::PurchaseReturn,
            ReasonRequest::SaleReturn => Self::SaleReturn,
        }
    }
}

/// One movement in a batch request.
#[derive(Debug, Deserialize)]
pub struct MovementEntry {
    /// The product whose stock changes.
    pub product_id: String,
    /// Signed change in stock.
    pub quantity_delta: i64,
}

/// Apply-batch request body.
#[derive(Debug, Deserialize)]
pub struct ApplyBatchRequest {
    /// Batch id; ignored when the `Idempotency-Key` header is present.
    pub batch_id: Option<String>,
    /// Why the batch is being applied.
    pub reason: ReasonRequest,
    /// The movements to apply together.
    pub movements: Vec<MovementEntry>,
}

/// Apply-batch response.
#[derive(Debug, Serialize)]
pub struct ApplyBatchResponse {
    /// The batch id that was applied.
    pub batch_id: String,
    /// True when this call was an idempotent replay of an earlier commit.
    pub replayed: bool,
    /// Ledger-derived stock per affected product as of the batch's commit.
    pub stock_after: HashMap<String, i64>,
}

impl From<AppliedBatch> for ApplyBatchResponse {
    fn from(applied: AppliedBatch) -> Self {
        Self {
            batch_id: applied.batch_id.to_string(),
            replayed: applied.idempotent_replay,
            stock_after: applied
                .stock_after
                .into_iter()
                .map(|(product_id, stock)| (product_id.to_string(), stock))
                .collect(),
        }
    }
}

/// Reverse-batch response.
#[derive(Debug, Serialize)]
pub struct ReverseBatchResponse {
    /// The id of the reversing batch.
    pub batch_id: String,
    /// The batch that was reversed.
    pub reverses: String,
    /// Ledger-derived stock per affected product after the reversal.
    pub stock_after: HashMap<String, i64>,
}

/// One movement in a batch response.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    /// Movement id.
    pub id: String,
    /// The product whose stock changed.
    pub product_id: String,
    /// Signed change in stock.
    pub quantity_delta: i64,
    /// When the movement was written.
    pub created_at: String,
}

impl From<&StockMovement> for MovementResponse {
    fn from(movement: &StockMovement) -> Self {
        Self {
            id: movement.id.to_string(),
            product_id: movement.product_id.to_string(),
            quantity_delta: movement.quantity_delta,
            created_at: movement.created_at.to_rfc3339(),
        }
    }
}

/// Batch lookup response.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// The batch id.
    pub batch_id: String,
    /// Why the batch was applied.
    pub reason: MovementReason,
    /// When the batch committed.
    pub applied_at: String,
    /// The movements written by the batch.
    pub movements: Vec<MovementResponse>,
    /// Ledger-derived stock per affected product as of the commit.
    pub stock_after: HashMap<String, i64>,
}

/// Stock level response.
#[derive(Debug, Serialize)]
pub struct StockLevelResponse {
    /// Product ID.
    pub product_id: String,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Ledger-derived current stock. Negative values mean oversold stock.
    pub current_stock: i64,
    /// The product's configured alert threshold, if any.
    pub low_stock_threshold: Option<i64>,
}

impl From<StockLevel> for StockLevelResponse {
    fn from(level: StockLevel) -> Self {
        Self {
            product_id: level.product_id.to_string(),
            sku: level.sku,
            name: level.name,
            current_stock: level.current_stock,
            low_stock_threshold: level.low_stock_threshold,
        }
    }
}

/// Query parameters for the low-stock endpoint.
#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    /// Override for the default threshold.
    pub threshold: Option<i64>,
}

/// Single-product stock response.
#[derive(Debug, Serialize)]
pub struct CurrentStockResponse {
    /// Product ID.
    pub product_id: String,
    /// Ledger-derived current stock.
    pub current_stock: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Apply a movement batch.
pub async fn apply_batch(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    headers: HeaderMap,
    Json(body): Json<ApplyBatchRequest>,
) -> Result<Json<ApplyBatchResponse>, ApiError> {
    let batch_id = resolve_batch_id(&headers, body.batch_id.as_deref())?;

    let movements = parse_movements(&body.movements)?;

    tracing::debug!(
        service = %auth.service_name,
        batch_id = %batch_id,
        movements = movements.len(),
        "Processing stock batch"
    );

    let applied = state
        .engine
        .apply_batch(&batch_id, &movements, body.reason.into())?;

    Ok(Json(ApplyBatchResponse::from(applied)))
}

/// Get an applied batch with its movements.
pub async fn get_batch(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch_id = parse_batch_id(&batch_id)?;

    let record = state
        .store
        .get_batch(&batch_id)?
        .ok_or_else(|| ApiError::BatchNotFound {
            batch_id: batch_id.to_string(),
        })?;
    let movements = state.store.movements_for_batch(&batch_id)?;

    Ok(Json(BatchResponse {
        batch_id: record.batch_id.to_string(),
        reason: record.reason,
        applied_at: record.applied_at.to_rfc3339(),
        movements: movements.iter().map(MovementResponse::from).collect(),
        stock_after: record
            .stock_after
            .into_iter()
            .map(|(product_id, stock)| (product_id.to_string(), stock))
            .collect(),
    }))
}

/// Reverse a previously applied batch.
pub async fn reverse_batch(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(batch_id): Path<String>,
) -> Result<Json<ReverseBatchResponse>, ApiError> {
    let original = parse_batch_id(&batch_id)?;

    tracing::debug!(
        service = %auth.service_name,
        batch_id = %original,
        "Reversing stock batch"
    );

    let applied = state.reversals.reverse_batch(&original)?;

    Ok(Json(ReverseBatchResponse {
        batch_id: applied.batch_id.to_string(),
        reverses: original.to_string(),
        stock_after: applied
            .stock_after
            .into_iter()
            .map(|(product_id, stock)| (product_id.to_string(), stock))
            .collect(),
    }))
}

/// List every product with its current stock.
pub async fn stock_levels(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<Json<Vec<StockLevelResponse>>, ApiError> {
    let levels = state.query.stock_levels()?;
    Ok(Json(levels.into_iter().map(StockLevelResponse::from).collect()))
}

/// List products at or below their low-stock threshold.
pub async fn low_stock(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Query(params): Query<LowStockParams>,
) -> Result<Json<Vec<StockLevelResponse>>, ApiError> {
    let threshold = params
        .threshold
        .unwrap_or(state.config.low_stock_default_threshold);
    let levels = state.query.low_stock(threshold)?;
    Ok(Json(levels.into_iter().map(StockLevelResponse::from).collect()))
}

/// Get the current stock for one product.
pub async fn current_stock(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(product_id): Path<String>,
) -> Result<Json<CurrentStockResponse>, ApiError> {
    let product_id: ProductId = product_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid product ID".into()))?;

    let current_stock = state.query.current_stock(&product_id)?;

    Ok(Json(CurrentStockResponse {
        product_id: product_id.to_string(),
        current_stock,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve the batch id from the `Idempotency-Key` header or the body.
fn resolve_batch_id(headers: &HeaderMap, body_batch_id: Option<&str>) -> Result<BatchId, ApiError> {
    let raw = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or(body_batch_id)
        .ok_or_else(|| {
            ApiError::BadRequest("missing batch id: set the Idempotency-Key header or batch_id".into())
        })?;

    parse_batch_id(raw)
}

fn parse_batch_id(raw: &str) -> Result<BatchId, ApiError> {
    BatchId::new(raw).map_err(|_| ApiError::BadRequest("Invalid batch ID".into()))
}

fn parse_movements(entries: &[MovementEntry]) -> Result<Vec<MovementInput>, ApiError> {
    entries
        .iter()
        .map(|entry| {
            let product_id: ProductId = entry
                .product_id
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid product ID: {}", entry.product_id)))?;
            Ok(MovementInput::new(product_id, entry.quantity_delta))
        })
        .collect()
}
