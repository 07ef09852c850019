//! In-memory identity-to-endpoint directory.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::crypto::Identity;
use crate::error::MarketResult;
use crate::traits::DhtResolver;

#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    endpoints: Arc<RwLock<HashMap<Identity, SocketAddr>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }
}

#[async_trait]
impl DhtResolver for MockDirectory {
    async fn announce(
        &self,
        identity: &Identity,
        endpoint: SocketAddr,
        _announcer: &Identity,
    ) -> MarketResult<()> {
        self.endpoints.write().insert(*identity, endpoint);
        Ok(())
    }

    async fn resolve(&self, identity: &Identity) -> MarketResult<Option<SocketAddr>> {
        Ok(self.endpoints.read().get(identity).copied())
    }

    async fn withdraw(&self, identity: &Identity) -> MarketResult<()> {
        self.endpoints.write().remove(identity);
        Ok(())
    }
}
