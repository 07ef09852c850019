//! In-process network for testing.
//!
//! [`MockNetwork`] routes calls between [`MockTransport`]s by identity and
//! lets tests cut peers off or slow them down.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult, RemoteError};
use crate::rpc::protocol::Method;
use crate::traits::{RpcHandler, RpcTransport};

/// A call or notification as seen by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub from: Identity,
    pub to: Identity,
    pub method: Method,
}

#[derive(Default)]
struct NetworkState {
    handlers: HashMap<Identity, Arc<dyn RpcHandler>>,
    unreachable: HashSet<Identity>,
    delays: HashMap<Identity, Duration>,
    calls: Vec<RecordedCall>,
}

/// Shared routing table. Clones refer to the same network.
#[derive(Clone, Default)]
pub struct MockNetwork {
    state: Arc<RwLock<NetworkState>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that sends as `identity`.
    pub fn transport(&self, identity: Identity) -> MockTransport {
        MockTransport {
            identity,
            network: self.clone(),
        }
    }

    /// Serve `handler` at `identity`.
    pub fn attach(&self, identity: Identity, handler: Arc<dyn RpcHandler>) {
        self.state.write().handlers.insert(identity, handler);
    }

    pub fn detach(&self, identity: &Identity) {
        self.state.write().handlers.remove(identity);
    }

    /// Make every call to `identity` fail as if the host were down.
    pub fn set_unreachable(&self, identity: Identity, unreachable: bool) {
        let mut state = self.state.write();
        if unreachable {
            state.unreachable.insert(identity);
        } else {
            state.unreachable.remove(&identity);
        }
    }

    /// Delay every call to `identity` before it reaches the handler.
    pub fn set_delay(&self, identity: Identity, delay: Duration) {
        self.state.write().delays.insert(identity, delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().calls.clone()
    }

    pub fn count_calls(&self, to: &Identity, method: Method) -> usize {
        self.state
            .read()
            .calls
            .iter()
            .filter(|c| &c.to == to && c.method == method)
            .count()
    }

    /// Record the call and work out where it goes.
    fn route(
        &self,
        from: Identity,
        to: &Identity,
        method: Method,
    ) -> MarketResult<(Arc<dyn RpcHandler>, Option<Duration>)> {
        let mut state = self.state.write();
        state.calls.push(RecordedCall {
            from,
            to: *to,
            method,
        });
        if state.unreachable.contains(to) {
            return Err(MarketError::PeerUnreachable(format!(
                "{} is unreachable",
                to.short()
            )));
        }
        let handler = state.handlers.get(to).cloned().ok_or_else(|| {
            MarketError::PeerUnreachable(format!("no endpoint for {}", to.short()))
        })?;
        Ok((handler, state.delays.get(to).copied()))
    }
}

#[derive(Clone)]
pub struct MockTransport {
    identity: Identity,
    network: MockNetwork,
}

#[async_trait]
impl RpcTransport for MockTransport {
    fn local_identity(&self) -> Identity {
        self.identity
    }

    async fn call(
        &self,
        target: &Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        let (handler, delay) = self.network.route(self.identity, target, method)?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        // Errors cross the wire as their kind, exactly like the TCP transport.
        handler
            .handle(self.identity, method, payload)
            .await
            .map_err(|e| MarketError::from(RemoteError::from(&e)))
    }

    async fn notify(&self, target: &Identity, payload: Vec<u8>) -> MarketResult<()> {
        let (handler, delay) = self.network.route(self.identity, target, Method::Notify)?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        // Delivered inline so tests observe the inbox once the send returns.
        if let Err(e) = handler.handle(self.identity, Method::Notify, payload).await {
            debug!("notification to {} dropped: {}", target.short(), e);
        }
        Ok(())
    }
}
