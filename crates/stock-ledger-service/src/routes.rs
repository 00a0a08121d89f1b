//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, products, stock};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for stock endpoints. Batch submission is the
/// high-volume path (every purchase, sale and return goes through it).
const STOCK_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Products (service API key auth)
/// - `POST /v1/products` - Register a product
/// - `GET /v1/products` - List products
/// - `GET /v1/products/:id` - Get a product
///
/// ## Stock (service API key auth, concurrency-limited)
/// - `POST /v1/stock/batches` - Apply a movement batch (idempotent by batch id)
/// - `GET /v1/stock/batches/:batch_id` - Get an applied batch
/// - `POST /v1/stock/batches/:batch_id/reverse` - Reverse an applied batch
/// - `GET /v1/stock/levels` - All products with current stock
/// - `GET /v1/stock/levels/low` - Products at or below their threshold
/// - `GET /v1/stock/levels/:product_id` - Current stock for one product
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Stock routes carry the write path, so they get their own higher
    // concurrency limit while staying protected from overload.
    let stock_routes = Router::new()
        .route("/batches", post(stock::apply_batch))
        .route("/batches/:batch_id", get(stock::get_batch))
        .route("/batches/:batch_id/reverse", post(stock::reverse_batch))
        .route("/levels", get(stock::stock_levels))
        .route("/levels/low", get(stock::low_stock))
        .route("/levels/:product_id", get(stock::current_stock))
        .layer(ConcurrencyLimitLayer::new(STOCK_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Products
        .route("/products", post(products::create_product))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        // Stock routes (with their own concurrency limit)
        .nest("/stock", stock_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
