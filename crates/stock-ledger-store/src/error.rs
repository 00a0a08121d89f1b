//! Error types for stock ledger storage.

use stock_ledger_core::{BatchId, ProductId};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger storage operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Database operation failed. The batch write aborted with zero partial
    /// writes.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A movement referenced a product that is not registered.
    #[error("unknown product: {product_id}")]
    UnknownProduct {
        /// The product id that was not found.
        product_id: ProductId,
    },

    /// A batch id was not found.
    #[error("batch not found: {batch_id}")]
    BatchNotFound {
        /// The batch id that was not found.
        batch_id: BatchId,
    },

    /// A batch id has already been applied (idempotency check).
    #[error("duplicate batch: {batch_id}")]
    DuplicateBatch {
        /// The batch id that was already applied.
        batch_id: BatchId,
    },

    /// A reversing batch targeted a batch that is already reversed.
    #[error("batch {batch_id} already reversed by {reversed_by}")]
    AlreadyReversed {
        /// The batch whose reversal was attempted again.
        batch_id: BatchId,
        /// The batch that already reverses it.
        reversed_by: BatchId,
    },

    /// A batch was submitted with no movements.
    #[error("empty batch")]
    EmptyBatch,
}
