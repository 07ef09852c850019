//! Identity-to-endpoint resolution, the only thing the core needs from a DHT.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::crypto::Identity;
use crate::error::MarketResult;

/// Abstraction over the DHT service that maps a public key to a reachable
/// network address.
#[async_trait]
pub trait DhtResolver: Send + Sync + Clone + 'static {
    /// Publish "`identity` is reachable at `endpoint`".
    ///
    /// `announcer` is the DHT-level identity that owns the record.
    async fn announce(
        &self,
        identity: &Identity,
        endpoint: SocketAddr,
        announcer: &Identity,
    ) -> MarketResult<()>;

    /// Resolve an identity. Returns `None` if nothing is published for it.
    async fn resolve(&self, identity: &Identity) -> MarketResult<Option<SocketAddr>>;

    /// Remove our published endpoint. Absent records are not an error.
    async fn withdraw(&self, identity: &Identity) -> MarketResult<()>;
}
