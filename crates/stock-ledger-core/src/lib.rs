//! Core types for the stock ledger.
//!
//! This crate provides the foundational types used throughout the stock
//! ledger platform:
//!
//! - **Identifiers**: `ProductId`, `MovementId`, `BatchId`
//! - **Movements**: `StockMovement`, `MovementInput`, `MovementReason`
//! - **Batches**: `BatchRecord`
//! - **Products**: `Product`
//!
//! # Quantities
//!
//! Stock quantities are signed `i64` deltas. Positive deltas increase stock,
//! negative deltas decrease it. The current stock of a product is always the
//! sum of all committed deltas for that product; it is never stored as an
//! independently writable counter. Negative sums are valid data (oversold or
//! unaccounted shrinkage) and are surfaced, not clamped.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod movement;
pub mod product;

pub use ids::{BatchId, IdError, MovementId, ProductId};
pub use movement::{BatchRecord, MovementInput, MovementReason, StockMovement};
pub use product::Product;
