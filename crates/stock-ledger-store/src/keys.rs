//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families. Product and movement keys are fixed-width (16 bytes).
//! Batch ids are variable-length strings, so batch-prefixed index keys insert
//! a NUL separator after the batch id; `BatchId` guarantees the id itself
//! contains no NUL byte, which keeps the prefix unambiguous.

use stock_ledger_core::{BatchId, MovementId, ProductId};

/// Create a product key from a product ID.
#[must_use]
pub fn product_key(product_id: &ProductId) -> Vec<u8> {
    product_id.as_bytes().to_vec()
}

/// Create a movement key from a movement ID.
#[must_use]
pub fn movement_key(movement_id: &MovementId) -> Vec<u8> {
    movement_id.to_bytes().to_vec()
}

/// Create a product-movement index key.
///
/// Format: `product_id (16 bytes) || movement_id (16 bytes)`
///
/// Since ULIDs are time-ordered, movements for a product sort by time.
#[must_use]
pub fn product_movement_key(product_id: &ProductId, movement_id: &MovementId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(product_id.as_bytes());
    key.extend_from_slice(&movement_id.to_bytes());
    key
}

/// Create a prefix for iterating all movements for a product.
#[must_use]
pub fn product_movements_prefix(product_id: &ProductId) -> Vec<u8> {
    product_id.as_bytes().to_vec()
}

/// Create a batch-movement index key.
///
/// Format: `batch_id bytes || 0x00 || movement_id (16 bytes)`
#[must_use]
pub fn batch_movement_key(batch_id: &BatchId, movement_id: &MovementId) -> Vec<u8> {
    let mut key = Vec::with_capacity(batch_id.as_str().len() + 17);
    key.extend_from_slice(batch_id.as_ref());
    key.push(0);
    key.extend_from_slice(&movement_id.to_bytes());
    key
}

/// Create a prefix for iterating all movements in a batch.
#[must_use]
pub fn batch_movements_prefix(batch_id: &BatchId) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(batch_id.as_str().len() + 1);
    prefix.extend_from_slice(batch_id.as_ref());
    prefix.push(0);
    prefix
}

/// Extract the movement ID from the tail of an index key.
///
/// Works for both index layouts because the movement id is always the last
/// 16 bytes of the key.
///
/// # Panics
///
/// Panics if the key is shorter than 16 bytes.
#[must_use]
pub fn extract_movement_id(key: &[u8]) -> MovementId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[key.len() - 16..]);
    MovementId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create a batch record key from a batch ID.
#[must_use]
pub fn batch_key(batch_id: &BatchId) -> Vec<u8> {
    batch_id.as_ref().to_vec()
}

/// Create a reversal index key from the original batch ID.
#[must_use]
pub fn reversal_key(batch_id: &BatchId) -> Vec<u8> {
    batch_id.as_ref().to_vec()
}

/// Encode a quantity delta as an index value.
#[must_use]
pub fn encode_delta(delta: i64) -> [u8; 8] {
    delta.to_be_bytes()
}

/// Decode a quantity delta from an index value.
///
/// Returns `None` if the value is not exactly 8 bytes.
#[must_use]
pub fn decode_delta(value: &[u8]) -> Option<i64> {
    let bytes: [u8; 8] = value.try_into().ok()?;
    Some(i64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_key_length() {
        let product_id = ProductId::generate();
        let key = product_key(&product_id);
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn product_movement_key_format() {
        let product_id = ProductId::generate();
        let movement_id = MovementId::generate();
        let key = product_movement_key(&product_id, &movement_id);

        assert_eq!(key.len(), 32);
        assert_eq!(&key[..16], product_id.as_bytes());
        assert_eq!(&key[16..], movement_id.to_bytes());
    }

    #[test]
    fn batch_prefix_is_unambiguous() {
        let short = BatchId::new("po-1").unwrap();
        let long = BatchId::new("po-10").unwrap();
        let movement_id = MovementId::generate();

        let long_key = batch_movement_key(&long, &movement_id);
        assert!(!long_key.starts_with(&batch_movements_prefix(&short)));
        assert!(long_key.starts_with(&batch_movements_prefix(&long)));
    }

    #[test]
    fn extract_movement_id_roundtrip() {
        let product_id = ProductId::generate();
        let movement_id = MovementId::generate();

        let key = product_movement_key(&product_id, &movement_id);
        assert_eq!(extract_movement_id(&key), movement_id);

        let batch_id = BatchId::new("adj-55").unwrap();
        let key = batch_movement_key(&batch_id, &movement_id);
        assert_eq!(extract_movement_id(&key), movement_id);
    }

    #[test]
    fn delta_roundtrip() {
        for delta in [0_i64, 50, -12, i64::MIN, i64::MAX] {
            assert_eq!(decode_delta(&encode_delta(delta)), Some(delta));
        }
        assert_eq!(decode_delta(&[0u8; 4]), None);
    }
}
