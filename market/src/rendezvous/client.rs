//! Peer-side calls to the rendezvous service.

use tracing::{info, warn};

use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::rpc::protocol::Method;
use crate::rpc::RpcClient;
use crate::traits::RpcTransport;
use crate::util;

/// All three calls are idempotent, so each is retried on timeouts and
/// unreachable-peer failures.
#[derive(Clone)]
pub struct RendezvousClient<T: RpcTransport> {
    client: RpcClient<T>,
    rendezvous: Identity,
}

impl<T: RpcTransport> RendezvousClient<T> {
    pub const fn new(client: RpcClient<T>, rendezvous: Identity) -> Self {
        Self { client, rendezvous }
    }

    pub async fn register(&self, identity: &Identity) -> MarketResult<()> {
        let reply = self
            .client
            .call_with_retry(&self.rendezvous, Method::Register, identity.as_bytes().to_vec())
            .await?;
        expect_success(Method::Register, &reply)?;
        info!("Registered {} with rendezvous {}", identity.short(), self.rendezvous.short());
        Ok(())
    }

    pub async fn peers(&self) -> MarketResult<Vec<Identity>> {
        let reply = self
            .client
            .call_with_retry(&self.rendezvous, Method::Peers, Vec::new())
            .await?;
        util::decode(&reply)
    }

    pub async fn deregister(&self, identity: &Identity) -> MarketResult<()> {
        let reply = self
            .client
            .call_with_retry(&self.rendezvous, Method::Closing, identity.as_bytes().to_vec())
            .await?;
        expect_success(Method::Closing, &reply)
    }

    /// Deregister, logging instead of failing. Used on the way out.
    pub async fn deregister_best_effort(&self, identity: &Identity) {
        match self.deregister(identity).await {
            Ok(()) => info!("Deregistered {} from rendezvous", identity.short()),
            Err(e) => warn!("Failed to deregister {} from rendezvous: {}", identity.short(), e),
        }
    }
}

fn expect_success(method: Method, reply: &[u8]) -> MarketResult<()> {
    if util::decode::<bool>(reply)? {
        Ok(())
    } else {
        Err(MarketError::Protocol(format!("rendezvous refused {method}")))
    }
}
