//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksLedgerStore` implementation of the
//! [`LedgerStore`] trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use stock_ledger_core::{
    BatchId, BatchRecord, MovementId, MovementInput, MovementReason, Product, ProductId,
    StockMovement,
};

use crate::error::{LedgerError, Result};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::LedgerStore;

/// RocksDB-backed ledger storage.
pub struct RocksLedgerStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes the duplicate-batch check with its commit, so two racing
    /// submissions of the same batch id cannot both pass the check.
    append_lock: Mutex<()>,
}

impl RocksLedgerStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            append_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Get a movement row by id.
    fn get_movement(&self, movement_id: &MovementId) -> Result<Option<StockMovement>> {
        let cf = self.cf(cf::MOVEMENTS)?;
        let key = keys::movement_key(movement_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl LedgerStore for RocksLedgerStore {
    // =========================================================================
    // Product Registry
    // =========================================================================

    fn put_product(&self, product: &Product) -> Result<()> {
        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(&product.id);
        let value = Self::serialize(product)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(product_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        let cf = self.cf(cf::PRODUCTS)?;

        let mut products = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| LedgerError::Database(e.to_string()))?;
            products.push(Self::deserialize(&value)?);
        }

        Ok(products)
    }

    // =========================================================================
    // Ledger Writes
    // =========================================================================

    fn append_batch(
        &self,
        batch_id: &BatchId,
        reason: MovementReason,
        movements: &[MovementInput],
    ) -> Result<BatchRecord> {
        if movements.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }

        // Critical section: the duplicate check, the stock snapshot and the
        // commit must not interleave with another append.
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| LedgerError::Database("append lock poisoned".into()))?;

        if self.batch_exists(batch_id)? {
            return Err(LedgerError::DuplicateBatch {
                batch_id: batch_id.clone(),
            });
        }

        // The reversed-once guard must live in the same critical section as
        // the commit: two racing reversals carry distinct fresh batch ids, so
        // the duplicate check alone would let both through.
        if let Some(original) = reason.reversed_batch() {
            if let Some(reversed_by) = self.reversal_of(original)? {
                return Err(LedgerError::AlreadyReversed {
                    batch_id: original.clone(),
                    reversed_by,
                });
            }
        }

        // Validate every product before writing anything.
        for movement in movements {
            if !self.product_exists(&movement.product_id)? {
                return Err(LedgerError::UnknownProduct {
                    product_id: movement.product_id,
                });
            }
        }

        // Snapshot ledger sums for the affected products, then fold in the
        // batch's deltas. Committed under the append lock, this equals the
        // post-commit ledger sum.
        let mut stock_after: HashMap<ProductId, i64> = HashMap::new();
        for movement in movements {
            if !stock_after.contains_key(&movement.product_id) {
                let current = self.sum_for_product(&movement.product_id)?;
                stock_after.insert(movement.product_id, current);
            }
        }
        for movement in movements {
            if let Some(sum) = stock_after.get_mut(&movement.product_id) {
                *sum += movement.quantity_delta;
            }
        }

        let cf_movements = self.cf(cf::MOVEMENTS)?;
        let cf_by_product = self.cf(cf::MOVEMENTS_BY_PRODUCT)?;
        let cf_by_batch = self.cf(cf::MOVEMENTS_BY_BATCH)?;
        let cf_batches = self.cf(cf::BATCHES)?;

        let now = chrono::Utc::now();
        let mut batch = WriteBatch::default();

        for input in movements {
            let movement = StockMovement {
                id: MovementId::generate(),
                product_id: input.product_id,
                batch_id: batch_id.clone(),
                quantity_delta: input.quantity_delta,
                reason: reason.clone(),
                created_at: now,
            };

            let value = Self::serialize(&movement)?;
            batch.put_cf(&cf_movements, keys::movement_key(&movement.id), &value);
            batch.put_cf(
                &cf_by_product,
                keys::product_movement_key(&movement.product_id, &movement.id),
                keys::encode_delta(movement.quantity_delta),
            );
            batch.put_cf(
                &cf_by_batch,
                keys::batch_movement_key(batch_id, &movement.id),
                b"",
            );
        }

        let record = BatchRecord {
            batch_id: batch_id.clone(),
            reason: reason.clone(),
            movement_count: movements.len(),
            stock_after,
            applied_at: now,
        };
        let record_value = Self::serialize(&record)?;
        batch.put_cf(&cf_batches, keys::batch_key(batch_id), &record_value);

        // A reversal is linked to its original in the same atomic write, so
        // the double-reversal guard can never observe a half-applied state.
        if let Some(original) = reason.reversed_batch() {
            let cf_reversals = self.cf(cf::REVERSALS)?;
            batch.put_cf(&cf_reversals, keys::reversal_key(original), batch_id.as_ref());
        }

        self.db
            .write(batch)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        tracing::debug!(
            batch_id = %batch_id,
            reason = reason.as_str(),
            movements = movements.len(),
            "batch appended"
        );

        Ok(record)
    }

    // =========================================================================
    // Ledger Reads
    // =========================================================================

    fn sum_for_product(&self, product_id: &ProductId) -> Result<i64> {
        let cf = self.cf(cf::MOVEMENTS_BY_PRODUCT)?;
        let prefix = keys::product_movements_prefix(product_id);

        let mut sum = 0_i64;
        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, value) = item.map_err(|e| LedgerError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let delta = keys::decode_delta(&value).ok_or_else(|| {
                LedgerError::Serialization("malformed delta in product index".into())
            })?;
            sum += delta;
        }

        Ok(sum)
    }

    fn get_batch(&self, batch_id: &BatchId) -> Result<Option<BatchRecord>> {
        let cf = self.cf(cf::BATCHES)?;
        let key = keys::batch_key(batch_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn movements_for_batch(&self, batch_id: &BatchId) -> Result<Vec<StockMovement>> {
        if !self.batch_exists(batch_id)? {
            return Err(LedgerError::BatchNotFound {
                batch_id: batch_id.clone(),
            });
        }

        let cf = self.cf(cf::MOVEMENTS_BY_BATCH)?;
        let prefix = keys::batch_movements_prefix(batch_id);

        let mut movements = Vec::new();
        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, _) = item.map_err(|e| LedgerError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let movement_id = keys::extract_movement_id(&key);
            if let Some(movement) = self.get_movement(&movement_id)? {
                movements.push(movement);
            }
        }

        Ok(movements)
    }

    fn reversal_of(&self, batch_id: &BatchId) -> Result<Option<BatchId>> {
        let cf = self.cf(cf::REVERSALS)?;
        let key = keys::reversal_key(batch_id);

        let Some(value) = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let reversed_by = String::from_utf8(value.to_vec())
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let reversed_by = BatchId::new(reversed_by)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        Ok(Some(reversed_by))
    }
}
