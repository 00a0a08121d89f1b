//! The reversal coordinator: one code path for undoing a batch.
//!
//! Deleting a purchase order, return or manual adjustment must put stock back
//! where it was. Instead of each flow hand-rolling its own opposite
//! operation, the coordinator looks up the original batch, negates every
//! movement and submits the result through the adjustment engine, inheriting
//! its atomicity and validation guarantees.

use std::sync::Arc;

use ulid::Ulid;

use stock_ledger_core::{BatchId, MovementInput, MovementReason};
use stock_ledger_store::{LedgerError, LedgerStore};

use crate::adjustment::{AdjustmentEngine, AppliedBatch};
use crate::error::{AdjustmentError, ReversalError};

/// Computes and applies the inverse of a previously applied batch.
pub struct ReversalCoordinator<S> {
    store: Arc<S>,
    engine: AdjustmentEngine<S>,
}

impl<S> Clone for ReversalCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: self.engine.clone(),
        }
    }
}

impl<S: LedgerStore> ReversalCoordinator<S> {
    /// Create a coordinator on top of a ledger store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        let engine = AdjustmentEngine::new(Arc::clone(&store));
        Self { store, engine }
    }

    /// Reverse a previously applied batch.
    ///
    /// Constructs a new batch with every quantity delta negated and
    /// `reason = ReversalOf { original }`, and applies it through the
    /// adjustment engine. A batch can be reversed at most once; retrying a
    /// delete action surfaces `AlreadyReversed` instead of double-crediting.
    ///
    /// # Errors
    ///
    /// - `ReversalError::BatchNotFound` if the original batch was never
    ///   applied.
    /// - `ReversalError::AlreadyReversed` if a reversal already exists.
    /// - `ReversalError::Adjustment` if applying the reversing batch fails.
    pub fn reverse_batch(&self, original: &BatchId) -> Result<AppliedBatch, ReversalError> {
        let movements = match self.store.movements_for_batch(original) {
            Ok(movements) => movements,
            Err(LedgerError::BatchNotFound { batch_id }) => {
                return Err(ReversalError::BatchNotFound { batch_id });
            }
            Err(e) => return Err(ReversalError::Adjustment(e.into())),
        };

        // Fast-path check; the authoritative guard runs inside the store's
        // append critical section and surfaces below if this races.
        if let Some(reversed_by) = self
            .store
            .reversal_of(original)
            .map_err(|e| ReversalError::Adjustment(e.into()))?
        {
            return Err(ReversalError::AlreadyReversed {
                batch_id: original.clone(),
                reversed_by,
            });
        }

        let inverse: Vec<MovementInput> = movements
            .iter()
            .map(|m| MovementInput::new(m.product_id, -m.quantity_delta))
            .collect();

        // Fresh id for the reversing batch; the reason records which batch it
        // undoes. A "rev-" + ULID string always passes batch-id validation.
        let reversal_id = BatchId::new(format!("rev-{}", Ulid::new())).map_err(|e| {
            ReversalError::Adjustment(AdjustmentError::Storage(
                stock_ledger_store::LedgerError::Serialization(e.to_string()),
            ))
        })?;

        tracing::info!(
            original = %original,
            reversal = %reversal_id,
            movements = inverse.len(),
            "reversing stock batch"
        );

        let applied = match self.engine.apply_batch(
            &reversal_id,
            &inverse,
            MovementReason::ReversalOf {
                batch_id: original.clone(),
            },
        ) {
            Ok(applied) => applied,
            // Lost a race with a concurrent reversal of the same original:
            // the store's in-lock guard rejected this one.
            Err(AdjustmentError::Storage(LedgerError::AlreadyReversed {
                batch_id,
                reversed_by,
            })) => {
                return Err(ReversalError::AlreadyReversed {
                    batch_id,
                    reversed_by,
                });
            }
            Err(e) => return Err(ReversalError::Adjustment(e)),
        };

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_ledger_core::{Product, ProductId};
    use stock_ledger_store::RocksLedgerStore;
    use tempfile::TempDir;

    struct Fixture {
        engine: AdjustmentEngine<RocksLedgerStore>,
        coordinator: ReversalCoordinator<RocksLedgerStore>,
        store: Arc<RocksLedgerStore>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksLedgerStore::open(dir.path()).unwrap());
        Fixture {
            engine: AdjustmentEngine::new(Arc::clone(&store)),
            coordinator: ReversalCoordinator::new(Arc::clone(&store)),
            store,
            _dir: dir,
        }
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
    fn reversal_restores_pre_batch_stock() {
        let f = fixture();
        let p1 = register_product(&f.store, "P1");
        let p2 = register_product(&f.store, "P2");

        f.engine
            .apply_batch(
                &batch_id("po-1"),
                &[MovementInput::new(p1, 10), MovementInput::new(p2, 4)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();

        let reversed = f.coordinator.reverse_batch(&batch_id("po-1")).unwrap();
        assert_eq!(reversed.stock_after[&p1], 0);
        assert_eq!(reversed.stock_after[&p2], 0);
        assert_eq!(f.store.sum_for_product(&p1).unwrap(), 0);
        assert_eq!(f.store.sum_for_product(&p2).unwrap(), 0);
    }

    #[test]
    fn reversing_missing_batch_fails() {
        let f = fixture();

        let result = f.coordinator.reverse_batch(&batch_id("no-such-batch"));
        assert!(matches!(result, Err(ReversalError::BatchNotFound { .. })));
    }

    #[test]
    fn second_reversal_is_rejected_and_changes_nothing() {
        let f = fixture();
        let p1 = register_product(&f.store, "P1");

        f.engine
            .apply_batch(
                &batch_id("so-1"),
                &[MovementInput::new(p1, -12)],
                MovementReason::SaleFulfilled,
            )
            .unwrap();

        let first = f.coordinator.reverse_batch(&batch_id("so-1")).unwrap();
        assert_eq!(first.stock_after[&p1], 0);

        let second = f.coordinator.reverse_batch(&batch_id("so-1"));
        assert!(matches!(
            second,
            Err(ReversalError::AlreadyReversed { batch_id: b, .. }) if b == batch_id("so-1")
        ));
        assert_eq!(f.store.sum_for_product(&p1).unwrap(), 0);
    }

    #[test]
    fn reversal_movements_carry_the_link_to_the_original() {
        let f = fixture();
        let p1 = register_product(&f.store, "P1");

        f.engine
            .apply_batch(
                &batch_id("adj-1"),
                &[MovementInput::new(p1, 7)],
                MovementReason::ManualAdjustment {
                    note: "found extra".into(),
                },
            )
            .unwrap();

        let reversed = f.coordinator.reverse_batch(&batch_id("adj-1")).unwrap();
        let movements = f.store.movements_for_batch(&reversed.batch_id).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity_delta, -7);
        assert_eq!(
            movements[0].reason,
            MovementReason::ReversalOf {
                batch_id: batch_id("adj-1")
            }
        );
    }

    #[test]
    fn racing_reversals_commit_exactly_once() {
        // Two reversal submissions that both observed reversal_of = None
        // reach the engine with distinct fresh ids. The store's in-lock
        // guard lets only the first commit.
        let f = fixture();
        let p1 = register_product(&f.store, "P1");

        f.engine
            .apply_batch(
                &batch_id("so-1"),
                &[MovementInput::new(p1, -12)],
                MovementReason::SaleFulfilled,
            )
            .unwrap();

        let reason = MovementReason::ReversalOf {
            batch_id: batch_id("so-1"),
        };
        f.engine
            .apply_batch(&batch_id("rev-a"), &[MovementInput::new(p1, 12)], reason.clone())
            .unwrap();
        let second =
            f.engine
                .apply_batch(&batch_id("rev-b"), &[MovementInput::new(p1, 12)], reason);

        assert!(matches!(
            second,
            Err(AdjustmentError::Storage(LedgerError::AlreadyReversed { .. }))
        ));
        // Stock is credited back exactly once.
        assert_eq!(f.store.sum_for_product(&p1).unwrap(), 0);
    }

    #[test]
    fn purchase_then_sale_then_reverse_sale() {
        // Product P1 starts at 0. Receive 50, fulfill 12, undo the sale
        // twice: the second undo is rejected and stock stays at 50.
        let f = fixture();
        let p1 = register_product(&f.store, "P1");

        let applied = f
            .engine
            .apply_batch(
                &batch_id("B1"),
                &[MovementInput::new(p1, 50)],
                MovementReason::PurchaseReceived,
            )
            .unwrap();
        assert_eq!(applied.stock_after[&p1], 50);

        let applied = f
            .engine
            .apply_batch(
                &batch_id("B2"),
                &[MovementInput::new(p1, -12)],
                MovementReason::SaleFulfilled,
            )
            .unwrap();
        assert_eq!(applied.stock_after[&p1], 38);

        let reversed = f.coordinator.reverse_batch(&batch_id("B2")).unwrap();
        assert_eq!(reversed.stock_after[&p1], 50);

        let again = f.coordinator.reverse_batch(&batch_id("B2"));
        assert!(matches!(again, Err(ReversalError::AlreadyReversed { .. })));
        assert_eq!(f.store.sum_for_product(&p1).unwrap(), 50);
    }
}
