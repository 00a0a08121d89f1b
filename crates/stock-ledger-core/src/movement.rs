//! Stock movement types.
//!
//! A [`StockMovement`] is one immutable, append-only row in the ledger. All
//! movements sharing a [`BatchId`] apply together or not at all; corrections
//! never update existing rows, they append a reversing batch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatchId, MovementId, ProductId};

/// Why a stock movement happened.
///
/// Reversals carry the batch they undo so the ledger records the link between
/// an event and its correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementReason {
    /// Stock received against a purchase order.
    PurchaseReceived,

    /// Stock shipped to fulfill a sale.
    SaleFulfilled,

    /// A manual stock correction with a free-form note.
    ManualAdjustment {
        /// Operator-supplied reason for the adjustment.
        note: String,
    },

    /// Stock sent back to a supplier.
    PurchaseReturn,

    /// Stock received back from a customer.
    SaleReturn,

    /// The inverse of a previously applied batch.
    ReversalOf {
        /// The batch this one undoes.
        batch_id: BatchId,
    },
}

impl MovementReason {
    /// Get the reason kind as a string (for logging and display).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseReceived => "purchase_received",
            Self::SaleFulfilled => "sale_fulfilled",
            Self::ManualAdjustment { .. } => "manual_adjustment",
            Self::PurchaseReturn => "purchase_return",
            Self::SaleReturn => "sale_return",
            Self::ReversalOf { .. } => "reversal_of",
        }
    }

    /// The batch this reason reverses, if it is a reversal.
    #[must_use]
    pub fn reversed_batch(&self) -> Option<&BatchId> {
        match self {
            Self::ReversalOf { batch_id } => Some(batch_id),
            _ => None,
        }
    }
}

/// One movement as submitted by a caller, before the store assigns an id and
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementInput {
    /// The product whose stock changes.
    pub product_id: ProductId,

    /// Signed change in stock. Positive increases, negative decreases.
    pub quantity_delta: i64,
}

impl MovementInput {
    /// Create a movement input.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity_delta: i64) -> Self {
        Self {
            product_id,
            quantity_delta,
        }
    }

    /// The same movement with its delta negated.
    #[must_use]
    pub const fn negated(&self) -> Self {
        Self {
            product_id: self.product_id,
            quantity_delta: -self.quantity_delta,
        }
    }
}

/// An immutable row in the stock ledger.
///
/// Movements are never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique movement id (ULID, time-ordered).
    pub id: MovementId,

    /// The product whose stock changed.
    pub product_id: ProductId,

    /// The batch this movement belongs to (atomicity boundary).
    pub batch_id: BatchId,

    /// Signed change in stock.
    pub quantity_delta: i64,

    /// Why the movement happened.
    pub reason: MovementReason,

    /// When the movement was written. Immutable.
    pub created_at: DateTime<Utc>,
}

/// The durable record of an applied batch.
///
/// `stock_after` snapshots the ledger-derived stock of every affected product
/// as of this batch's commit. It exists so an idempotent replay of the same
/// batch id can return the originally computed result; it is not a second
/// source of truth for current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// The batch id (idempotency key).
    pub batch_id: BatchId,

    /// Why the batch was applied.
    pub reason: MovementReason,

    /// Number of movements written by this batch.
    pub movement_count: usize,

    /// Ledger-derived stock per affected product as of this commit.
    pub stock_after: HashMap<ProductId, i64>,

    /// When the batch committed.
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_serde_tagging() {
        let reason = MovementReason::ManualAdjustment {
            note: "cycle count".into(),
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert!(json.contains("\"type\":\"manual_adjustment\""));
        let parsed: MovementReason = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reason);
    }

    #[test]
    fn reversal_reason_links_original() {
        let original = BatchId::new("po-receipt-7").unwrap();
        let reason = MovementReason::ReversalOf {
            batch_id: original.clone(),
        };
        assert_eq!(reason.reversed_batch(), Some(&original));
        assert_eq!(MovementReason::SaleFulfilled.reversed_batch(), None);
    }

    #[test]
    fn negated_input_flips_sign_only() {
        let input = MovementInput::new(ProductId::generate(), -12);
        let negated = input.negated();
        assert_eq!(negated.product_id, input.product_id);
        assert_eq!(negated.quantity_delta, 12);
    }
}
