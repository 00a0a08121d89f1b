//! HTTP request handlers.

pub mod health;
pub mod products;
pub mod stock;
