//! Stock Ledger HTTP API Service.
//!
//! This crate provides the HTTP API for the stock ledger, including:
//!
//! - Product registry management
//! - Movement batch submission (with idempotency keys)
//! - Batch reversal
//! - Stock level and low-stock queries
//!
//! # Authentication
//!
//! Callers are the business flows of the surrounding application (purchasing,
//! sales, returns, manual adjustments), authenticated service-to-service via
//! an API key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers must be async for routing even when the engine is sync

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
