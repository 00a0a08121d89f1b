//! Application state.

use std::sync::Arc;

use stock_ledger_engine::{AdjustmentEngine, ReversalCoordinator, StockQuery};
use stock_ledger_store::RocksLedgerStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksLedgerStore>,

    /// The single entry point for stock mutations.
    pub engine: AdjustmentEngine<RocksLedgerStore>,

    /// Undoes previously applied batches.
    pub reversals: ReversalCoordinator<RocksLedgerStore>,

    /// Read-side stock queries.
    pub query: StockQuery<RocksLedgerStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksLedgerStore>, config: ServiceConfig) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not configured - all API requests will be rejected");
        }

        Self {
            engine: AdjustmentEngine::new(Arc::clone(&store)),
            reversals: ReversalCoordinator::new(Arc::clone(&store)),
            query: StockQuery::new(Arc::clone(&store)),
            store,
            config,
        }
    }
}
