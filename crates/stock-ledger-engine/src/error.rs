//! Error types for the engine layer.

use stock_ledger_core::{BatchId, ProductId};
use stock_ledger_store::LedgerError;

/// Errors that can occur when applying a movement batch.
///
/// Validation errors (`UnknownProduct`, `EmptyBatch`) are rejected before any
/// write; the caller must correct the batch and resubmit. `Storage` errors
/// are transient and safe to retry with the same batch id.
#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    /// A movement referenced a product that is not registered.
    #[error("unknown product: {product_id}")]
    UnknownProduct {
        /// The product id that was not found.
        product_id: ProductId,
    },

    /// The batch contained no movements.
    #[error("empty batch")]
    EmptyBatch,

    /// The underlying ledger write or read failed.
    #[error("storage failure: {0}")]
    Storage(#[from] LedgerError),
}

/// Errors that can occur when reversing a batch.
///
/// Both variants are terminal for the reversal attempt: there is nothing to
/// undo, or it has already been undone.
#[derive(Debug, thiserror::Error)]
pub enum ReversalError {
    /// The batch to reverse was never applied.
    #[error("batch not found: {batch_id}")]
    BatchNotFound {
        /// The batch id that was not found.
        batch_id: BatchId,
    },

    /// The batch has already been reversed.
    #[error("batch {batch_id} already reversed by {reversed_by}")]
    AlreadyReversed {
        /// The batch whose reversal was attempted again.
        batch_id: BatchId,
        /// The batch that already reverses it.
        reversed_by: BatchId,
    },

    /// Applying the reversing batch failed.
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),
}

/// Errors that can occur in read-side queries.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The product is not registered.
    #[error("unknown product: {product_id}")]
    UnknownProduct {
        /// The product id that was not found.
        product_id: ProductId,
    },

    /// The underlying ledger read failed.
    #[error("storage failure: {0}")]
    Storage(#[from] LedgerError),
}
