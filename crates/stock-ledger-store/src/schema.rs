//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Product registry records, keyed by product UUID bytes.
    pub const PRODUCTS: &str = "products";

    /// Stock movements, keyed by `movement_id` (ULID bytes).
    pub const MOVEMENTS: &str = "movements";

    /// Index: movements by product, keyed by `product_id || movement_id`.
    /// Value is the big-endian `i64` quantity delta, so stock summation
    /// scans this index without loading movement rows.
    pub const MOVEMENTS_BY_PRODUCT: &str = "movements_by_product";

    /// Index: movements by batch, keyed by `batch_id || 0x00 || movement_id`.
    /// Value is empty (index only).
    pub const MOVEMENTS_BY_BATCH: &str = "movements_by_batch";

    /// Applied batch records, keyed by `batch_id` bytes.
    pub const BATCHES: &str = "batches";

    /// Reversal index: original `batch_id` -> reversing `batch_id` (UTF-8).
    pub const REVERSALS: &str = "reversals";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::PRODUCTS,
        cf::MOVEMENTS,
        cf::MOVEMENTS_BY_PRODUCT,
        cf::MOVEMENTS_BY_BATCH,
        cf::BATCHES,
        cf::REVERSALS,
    ]
}
