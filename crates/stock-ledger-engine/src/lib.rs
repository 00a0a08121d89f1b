//! Business layer of the stock ledger.
//!
//! Three components sit on top of the storage trait:
//!
//! - [`AdjustmentEngine`] — the single entry point for changing stock. Every
//!   business event (purchase received, sale fulfilled, manual adjustment,
//!   return) submits a movement batch here.
//! - [`ReversalCoordinator`] — undoes a previously applied batch by negating
//!   its movements and resubmitting them through the engine, so undo logic
//!   can never drift from apply logic.
//! - [`StockQuery`] — the read-only facade the rest of the application
//!   (alerts, dashboards, product listings) consumes. It has no mutation
//!   methods.
//!
//! All three are generic over [`LedgerStore`](stock_ledger_store::LedgerStore)
//! and hold the store behind an `Arc`, so one store instance can back an
//! engine, a coordinator and a query facade at the same time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod adjustment;
pub mod error;
pub mod query;
pub mod reversal;

pub use adjustment::{AdjustmentEngine, AppliedBatch};
pub use error::{AdjustmentError, QueryError, ReversalError};
pub use query::{StockLevel, StockQuery};
pub use reversal::ReversalCoordinator;
