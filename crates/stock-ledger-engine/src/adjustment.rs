//! The adjustment engine: the single writer of stock.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stock_ledger_core::{BatchId, MovementInput, MovementReason, ProductId};
use stock_ledger_store::{LedgerError, LedgerStore};

use crate::error::AdjustmentError;

/// The outcome of applying (or replaying) a movement batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedBatch {
    /// The batch that was applied.
    pub batch_id: BatchId,

    /// Ledger-derived stock of every affected product as of the batch's
    /// commit. Negative values mean oversold or unaccounted shrinkage and
    /// are surfaced as data, never clamped.
    pub stock_after: HashMap<ProductId, i64>,

    /// True when the batch id had already been committed and this call was a
    /// no-op replay returning the originally computed result.
    pub idempotent_replay: bool,
}

/// Validates and applies movement batches atomically.
///
/// This is the only component that writes stock. Callers submit a batch and
/// receive the resulting stock levels; no caller ever reads a counter,
/// computes a new value and writes it back.
pub struct AdjustmentEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for AdjustmentEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> AdjustmentEngine<S> {
    /// Create an engine on top of a ledger store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply a movement batch atomically.
    ///
    /// Resubmitting an already-committed batch id is a no-op success that
    /// returns the result computed when the batch first committed, so callers
    /// can safely retry after a timeout.
    ///
    /// # Errors
    ///
    /// - `AdjustmentError::EmptyBatch` if `movements` is empty.
    /// - `AdjustmentError::UnknownProduct` if any movement references an
    ///   unregistered product; no partial writes occur.
    /// - `AdjustmentError::Storage` if the ledger transaction fails; the
    ///   batch either committed entirely or not at all, and the same batch id
    ///   can be retried.
    pub fn apply_batch(
        &self,
        batch_id: &BatchId,
        movements: &[MovementInput],
        reason: MovementReason,
    ) -> Result<AppliedBatch, AdjustmentError> {
        if let Some(record) = self.store.get_batch(batch_id)? {
            tracing::debug!(batch_id = %batch_id, "batch already applied, replaying result");
            return Ok(AppliedBatch {
                batch_id: record.batch_id,
                stock_after: record.stock_after,
                idempotent_replay: true,
            });
        }

        if movements.is_empty() {
            return Err(AdjustmentError::EmptyBatch);
        }

        let record = match self.store.append_batch(batch_id, reason, movements) {
            Ok(record) => record,
            // Lost a race with a concurrent submission of the same batch id:
            // that submission committed, so replay its result.
            Err(LedgerError::DuplicateBatch { .. }) => {
                let record = self.store.get_batch(batch_id)?.ok_or_else(|| {
                    LedgerError::BatchNotFound {
                        batch_id: batch_id.clone(),
                    }
                })?;
                return Ok(AppliedBatch {
                    batch_id: record.batch_id,
                    stock_after: record.stock_after,
                    idempotent_replay: true,
                });
            }
            Err(LedgerError::UnknownProduct { product_id }) => {
                return Err(AdjustmentError::UnknownProduct { product_id });
            }
            Err(LedgerError::EmptyBatch) => return Err(AdjustmentError::EmptyBatch),
            Err(e) => return Err(AdjustmentError::Storage(e)),
        };

        tracing::info!(
            batch_id = %batch_id,
            reason = record.reason.as_str(),
            movements = record.movement_count,
            "stock batch applied"
        );

        Ok(AppliedBatch {
            batch_id: record.batch_id,
            stock_after: record.stock_after,
            idempotent_replay: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_ledger_core::Product;
    use stock_ledger_store::RocksLedgerStore;
    use tempfile::TempDir;

    fn create_engine() -> (AdjustmentEngine<RocksLedgerStore>, Arc<RocksLedgerStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksLedgerStore::open(dir.path()).unwrap());
        (AdjustmentEngine::new(Arc::clone(&store)), store, dir)
    }

    fn register_product(store: &RocksLedgerStore, sku: &str) -> ProductId {
        let product = Product::new(sku, sku);
        store.put_product(&product).unwrap();
        product.id
    }

    fn batch_id(s: &str) -> BatchId {
        BatchId::new(s).unwrap()
    }

    #[test]
    fn apply_batch_returns_new_stock() {
        let (engine, store, _dir) = create_engine();
        let p1 = register_product(&store, "P1");

        let applied = engine
            .apply_batch(
                &batch_id("po-1"),
                &[MovementInput::new(p1, 50)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();

        assert!(!applied.idempotent_replay);
        assert_eq!(applied.stock_after[&p1], 50);
    }

    #[test]
    fn empty_batch_rejected_before_any_write() {
        let (engine, store, _dir) = create_engine();

        let result = engine.apply_batch(&batch_id("b-0"), &[], MovementReason::PurchaseReceived);
        assert!(matches!(result, Err(AdjustmentError::EmptyBatch)));
        assert!(!store.batch_exists(&batch_id("b-0")).unwrap());
    }

    #[test]
    fn unknown_product_keeps_ledger_unchanged() {
        let (engine, store, _dir) = create_engine();
        let p1 = register_product(&store, "P1");
        let missing = ProductId::generate();

        let result = engine.apply_batch(
            &batch_id("po-1"),
            &[MovementInput::new(p1, 10), MovementInput::new(missing, 1)],
            MovementReason::PurchaseReceived,
        );

        assert!(matches!(
            result,
            Err(AdjustmentError::UnknownProduct { product_id }) if product_id == missing
        ));
        assert_eq!(store.sum_for_product(&p1).unwrap(), 0);
    }

    #[test]
    fn replay_returns_original_result_without_reapplying() {
        let (engine, store, _dir) = create_engine();
        let p1 = register_product(&store, "P1");
        let movements = [MovementInput::new(p1, 50)];

        let first = engine
            .apply_batch(&batch_id("po-1"), &movements, MovementReason::PurchaseReceived)
            .unwrap();
        let second = engine
            .apply_batch(&batch_id("po-1"), &movements, MovementReason::PurchaseReceived)
            .unwrap();

        assert!(!first.idempotent_replay);
        assert!(second.idempotent_replay);
        assert_eq!(second.stock_after, first.stock_after);

        // The ledger holds exactly one batch's movements.
        assert_eq!(store.sum_for_product(&p1).unwrap(), 50);
        assert_eq!(store.movements_for_batch(&batch_id("po-1")).unwrap().len(), 1);
    }

    #[test]
    fn replay_result_is_the_snapshot_at_first_commit() {
        let (engine, store, _dir) = create_engine();
        let p1 = register_product(&store, "P1");

        engine
            .apply_batch(
                &batch_id("po-1"),
                &[MovementInput::new(p1, 50)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();
        engine
            .apply_batch(
                &batch_id("so-1"),
                &[MovementInput::new(p1, -12)],
                MovementReason::SaleFulfilled,
            )
            .unwrap();

        // Replaying po-1 returns the already-computed result from its commit,
        // not the current ledger sum.
        let replay = engine
            .apply_batch(
                &batch_id("po-1"),
                &[MovementInput::new(p1, 50)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();
        assert!(replay.idempotent_replay);
        assert_eq!(replay.stock_after[&p1], 50);
        assert_eq!(store.sum_for_product(&p1).unwrap(), 38);
    }

    #[test]
    fn ledger_sum_matches_independent_accounting() {
        let (engine, store, _dir) = create_engine();
        let p1 = register_product(&store, "P1");
        let p2 = register_product(&store, "P2");

        let batches: &[(&str, MovementReason, Vec<MovementInput>)] = &[
            (
                "po-1",
                MovementReason::PurchaseReceived,
                vec![MovementInput::new(p1, 40), MovementInput::new(p2, 25)],
            ),
            (
                "so-1",
                MovementReason::SaleFulfilled,
                vec![MovementInput::new(p1, -13)],
            ),
            (
                "adj-1",
                MovementReason::ManualAdjustment {
                    note: "damaged in transit".into(),
                },
                vec![MovementInput::new(p2, -2)],
            ),
            (
                "ret-1",
                MovementReason::SaleReturn,
                vec![MovementInput::new(p1, 3)],
            ),
            (
                "pret-1",
                MovementReason::PurchaseReturn,
                vec![MovementInput::new(p2, -5)],
            ),
        ];

        let mut expected: HashMap<ProductId, i64> = HashMap::new();
        for (id, reason, movements) in batches {
            engine
                .apply_batch(&batch_id(id), movements, reason.clone())
                .unwrap();
            for movement in movements {
                *expected.entry(movement.product_id).or_default() += movement.quantity_delta;
            }
        }

        for (product_id, sum) in &expected {
            assert_eq!(store.sum_for_product(product_id).unwrap(), *sum);
        }
        assert_eq!(expected[&p1], 30);
        assert_eq!(expected[&p2], 18);
    }

    #[test]
    fn oversell_yields_negative_stock() {
        let (engine, store, _dir) = create_engine();
        let p1 = register_product(&store, "P1");

        engine
            .apply_batch(
                &batch_id("po-1"),
                &[MovementInput::new(p1, 5)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();
        let applied = engine
            .apply_batch(
                &batch_id("so-1"),
                &[MovementInput::new(p1, -9)],
                MovementReason::SaleFulfilled,
            )
            .unwrap();

        assert_eq!(applied.stock_after[&p1], -4);
        assert_eq!(store.sum_for_product(&p1).unwrap(), -4);
    }
}
