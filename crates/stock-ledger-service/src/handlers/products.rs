//! Product registry handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use stock_ledger_core::{Product, ProductId};
use stock_ledger_store::LedgerStore;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Product response.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: String,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Low-stock alert threshold, if configured.
    pub low_stock_threshold: Option<i64>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            low_stock_threshold: product.low_stock_threshold,
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

/// Create product request.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Stock-keeping unit code.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Low-stock alert threshold (optional).
    pub low_stock_threshold: Option<i64>,
}

/// Register a new product.
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    if body.sku.trim().is_empty() {
        return Err(ApiError::BadRequest("sku must not be empty".into()));
    }
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".into()));
    }

    let mut product = Product::new(body.sku, body.name);
    if let Some(threshold) = body.low_stock_threshold {
        product = product.with_low_stock_threshold(threshold);
    }

    state.store.put_product(&product)?;

    tracing::info!(
        service = %auth.service_name,
        product_id = %product.id,
        sku = %product.sku,
        "Product registered"
    );

    Ok(Json(ProductResponse::from(&product)))
}

/// List all registered products.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.store.list_products()?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// Get a product by ID.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(product_id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id: ProductId = product_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid product ID".into()))?;

    let product = state
        .store
        .get_product(&product_id)?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {product_id}")))?;

    Ok(Json(ProductResponse::from(&product)))
}
