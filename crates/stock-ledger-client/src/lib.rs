//! Stock Ledger Client SDK.
//!
//! This crate provides a client library for the business flows of the
//! surrounding application (purchasing, sales, returns, manual adjustments)
//! to interact with the stock-ledger API.
//!
//! # Example
//!
//! ```no_run
//! use stock_ledger_client::{MovementEntry, StockLedgerClient};
//!
//! # async fn example() -> Result<(), stock_ledger_client::ClientError> {
//! let client = StockLedgerClient::new(
//!     "http://stock-ledger.erp-system.svc:8080",
//!     "your-service-api-key",
//! );
//!
//! // Record a received purchase order; the PO number doubles as the
//! // idempotency key, so retries are safe.
//! let response = client
//!     .receive_purchase(
//!         "po-2041",
//!         vec![MovementEntry::new("3f6c1c9e-8a22-4a6d-9f3d-0b6f6f1f2a11", 50)],
//!     )
//!     .await?;
//!
//! println!("Stock after: {:?}", response.stock_after);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, StockLedgerClient};
pub use error::ClientError;
pub use types::*;
