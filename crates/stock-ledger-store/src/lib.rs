//! `RocksDB` storage layer for the stock ledger.
//!
//! This crate provides persistent, append-only storage for stock movements
//! using `RocksDB` with column families for efficient indexing. It owns every
//! `StockMovement` row: all writes go through [`LedgerStore::append_batch`],
//! which commits a whole batch in one atomic `WriteBatch` or not at all.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `products`: Product registry, keyed by product UUID
//! - `movements`: Movement rows, keyed by `movement_id` (ULID)
//! - `movements_by_product`: Index for summing stock per product; the index
//!   value carries the movement's quantity delta
//! - `movements_by_batch`: Index for listing the movements of a batch
//! - `batches`: One record per applied batch, keyed by `batch_id`
//! - `reversals`: Original `batch_id` -> reversing `batch_id`
//!
//! Current stock is never stored as a mutable counter. It is always derived
//! by summing the `movements_by_product` index.
//!
//! # Example
//!
//! ```no_run
//! use stock_ledger_store::{LedgerStore, RocksLedgerStore};
//! use stock_ledger_core::{BatchId, MovementInput, MovementReason, Product};
//!
//! let store = RocksLedgerStore::open("/tmp/stock-ledger-db").unwrap();
//!
//! let product = Product::new("WIDGET-1", "Widget");
//! store.put_product(&product).unwrap();
//!
//! let batch_id = BatchId::new("po-2024-0042").unwrap();
//! store
//!     .append_batch(
//!         &batch_id,
//!         MovementReason::PurchaseReceived,
//!         &[MovementInput::new(product.id, 50)],
//!     )
//!     .unwrap();
//!
//! assert_eq!(store.sum_for_product(&product.id).unwrap(), 50);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{LedgerError, Result};
pub use rocks::RocksLedgerStore;

use stock_ledger_core::{
    BatchId, BatchRecord, MovementInput, MovementReason, Product, ProductId, StockMovement,
};

/// The storage trait defining all ledger operations.
///
/// This trait abstracts the storage layer so the engine can be exercised
/// against different backends. The contract every implementation must honor:
/// `append_batch` is all-or-nothing, movements are never updated or deleted,
/// and `sum_for_product` reflects exactly the committed movements.
pub trait LedgerStore: Send + Sync {
    // =========================================================================
    // Product Registry
    // =========================================================================

    /// Insert or update a product record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_product(&self, product: &Product) -> Result<()>;

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// Check whether a product is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn product_exists(&self, product_id: &ProductId) -> Result<bool> {
        Ok(self.get_product(product_id)?.is_some())
    }

    /// List all registered products.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_products(&self) -> Result<Vec<Product>>;

    // =========================================================================
    // Ledger Writes
    // =========================================================================

    /// Append all movements of a batch in one atomic transaction.
    ///
    /// Assigns movement ids and timestamps, writes the movement rows, both
    /// indexes and the batch record together, and returns the batch record
    /// with the ledger-derived stock of every affected product as of this
    /// commit. For `MovementReason::ReversalOf` batches the reversal index is
    /// written in the same transaction.
    ///
    /// # Errors
    ///
    /// - `LedgerError::EmptyBatch` if `movements` is empty.
    /// - `LedgerError::DuplicateBatch` if the batch id was already applied.
    /// - `LedgerError::AlreadyReversed` if the reason is
    ///   `MovementReason::ReversalOf` and the target batch already has a
    ///   reversal recorded. Checked in the same critical section as the
    ///   commit, so two racing reversals cannot both apply.
    /// - `LedgerError::UnknownProduct` if any movement references an
    ///   unregistered product. No partial writes occur.
    /// - `LedgerError::Database` if the underlying transaction aborts.
    fn append_batch(
        &self,
        batch_id: &BatchId,
        reason: MovementReason,
        movements: &[MovementInput],
    ) -> Result<BatchRecord>;

    // =========================================================================
    // Ledger Reads
    // =========================================================================

    /// Return the ledger-derived current stock for a product.
    ///
    /// Pure read; sums the per-product index. Negative sums are returned
    /// as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn sum_for_product(&self, product_id: &ProductId) -> Result<i64>;

    /// Check whether a batch has been applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn batch_exists(&self, batch_id: &BatchId) -> Result<bool> {
        Ok(self.get_batch(batch_id)?.is_some())
    }

    /// Get the record of an applied batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_batch(&self, batch_id: &BatchId) -> Result<Option<BatchRecord>>;

    /// List the movements of a batch, in time order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BatchNotFound` if the batch was never applied.
    fn movements_for_batch(&self, batch_id: &BatchId) -> Result<Vec<StockMovement>>;

    /// Return the batch that reverses `batch_id`, if one has been applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn reversal_of(&self, batch_id: &BatchId) -> Result<Option<BatchId>>;
}
