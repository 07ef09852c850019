//! Durable key-value storage for seed material.

use async_trait::async_trait;

use crate::error::MarketResult;

/// Abstraction over the durable key-value collaborator.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if the key has never been written.
    async fn get(&self, key: &str) -> MarketResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> MarketResult<()>;
}
