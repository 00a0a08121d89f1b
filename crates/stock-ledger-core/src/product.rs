//! Product registry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A product known to the ledger.
///
/// The registry exists so batch validation can reject unknown products and
/// so the low-stock query has a per-product alert threshold. Current stock is
/// deliberately absent: it is always derived from the ledger, never stored on
/// the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product id.
    pub id: ProductId,

    /// Stock-keeping unit code.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Alert threshold for the low-stock query. `None` means the product
    /// falls back to the query's default threshold.
    pub low_stock_threshold: Option<i64>,

    /// When the product was registered.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product with a generated id.
    #[must_use]
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProductId::generate(),
            sku: sku.into(),
            name: name.into(),
            low_stock_threshold: None,
            created_at: Utc::now(),
        }
    }

    /// Set the low-stock alert threshold.
    #[must_use]
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }
}
