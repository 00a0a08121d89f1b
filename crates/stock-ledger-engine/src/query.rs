//! The read-side stock query facade.
//!
//! Dashboards, alerts and product listings consume stock through this facade
//! instead of touching raw ledger rows. It exposes no mutation methods, which
//! enforces the one-writer invariant: only the adjustment engine changes
//! stock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stock_ledger_core::ProductId;
use stock_ledger_store::LedgerStore;

use crate::error::QueryError;

/// A product together with its ledger-derived current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// The product id.
    pub product_id: ProductId,

    /// Stock-keeping unit code.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Sum of all committed quantity deltas. May be negative (oversold or
    /// unaccounted shrinkage); any floor-at-zero formatting belongs to the
    /// presentation layer.
    pub current_stock: i64,

    /// The product's configured alert threshold, if any.
    pub low_stock_threshold: Option<i64>,
}

/// Read-only queries over the ledger-backed stock view.
pub struct StockQuery<S> {
    store: Arc<S>,
}

impl<S> Clone for StockQuery<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> StockQuery<S> {
    /// Create a query facade on top of a ledger store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Return the current stock for a product.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownProduct` if the product is not registered,
    /// or `QueryError::Storage` on a read failure.
    pub fn current_stock(&self, product_id: &ProductId) -> Result<i64, QueryError> {
        if !self.store.product_exists(product_id)? {
            return Err(QueryError::UnknownProduct {
                product_id: *product_id,
            });
        }
        Ok(self.store.sum_for_product(product_id)?)
    }

    /// Return every registered product with its current stock.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` on a read failure.
    pub fn stock_levels(&self) -> Result<Vec<StockLevel>, QueryError> {
        let mut levels = Vec::new();
        for product in self.store.list_products()? {
            let current_stock = self.store.sum_for_product(&product.id)?;
            levels.push(StockLevel {
                product_id: product.id,
                sku: product.sku,
                name: product.name,
                current_stock,
                low_stock_threshold: product.low_stock_threshold,
            });
        }
        Ok(levels)
    }

    /// Return products whose current stock is at or below their alert
    /// threshold.
    ///
    /// Products without a configured threshold fall back to
    /// `default_threshold`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` on a read failure.
    pub fn low_stock(&self, default_threshold: i64) -> Result<Vec<StockLevel>, QueryError> {
        let mut low = self.stock_levels()?;
        low.retain(|level| {
            let threshold = level.low_stock_threshold.unwrap_or(default_threshold);
            level.current_stock <= threshold
        });
        Ok(low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_ledger_core::{BatchId, MovementInput, MovementReason, Product};
    use stock_ledger_store::RocksLedgerStore;
    use tempfile::TempDir;

    use crate::adjustment::AdjustmentEngine;

    fn fixture() -> (
        StockQuery<RocksLedgerStore>,
        AdjustmentEngine<RocksLedgerStore>,
        Arc<RocksLedgerStore>,
        TempDir,
    ) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksLedgerStore::open(dir.path()).unwrap());
        (
            StockQuery::new(Arc::clone(&store)),
            AdjustmentEngine::new(Arc::clone(&store)),
            store,
            dir,
        )
    }

    fn batch_id(s: &str) -> BatchId {
        BatchId::new(s).unwrap()
    }

    #[test]
    fn current_stock_for_unknown_product_fails() {
        let (query, _engine, _store, _dir) = fixture();

        let result = query.current_stock(&ProductId::generate());
        assert!(matches!(result, Err(QueryError::UnknownProduct { .. })));
    }

    #[test]
    fn current_stock_for_fresh_product_is_zero() {
        let (query, _engine, store, _dir) = fixture();
        let product = Product::new("P1", "P1");
        store.put_product(&product).unwrap();

        assert_eq!(query.current_stock(&product.id).unwrap(), 0);
    }

    #[test]
    fn low_stock_uses_per_product_threshold_with_default_fallback() {
        let (query, engine, store, _dir) = fixture();

        // P1 has its own threshold of 20, P2 falls back to the default.
        let p1 = Product::new("P1", "P1").with_low_stock_threshold(20);
        let p2 = Product::new("P2", "P2");
        store.put_product(&p1).unwrap();
        store.put_product(&p2).unwrap();

        engine
            .apply_batch(
                &batch_id("po-1"),
                &[MovementInput::new(p1.id, 15), MovementInput::new(p2.id, 15)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();

        let low = query.low_stock(10).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product_id, p1.id);
        assert_eq!(low[0].current_stock, 15);
    }

    #[test]
    fn stock_levels_report_negative_sums() {
        let (query, engine, store, _dir) = fixture();
        let p1 = Product::new("P1", "P1");
        store.put_product(&p1).unwrap();

        engine
            .apply_batch(
                &batch_id("so-1"),
                &[MovementInput::new(p1.id, -3)],
                MovementReason::SaleFulfilled,
            )
            .unwrap();

        let levels = query.stock_levels().unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].current_stock, -3);
    }
}
