//! Remote-call front for the [`Registry`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::registry::Registry;
use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::rpc::protocol::Method;
use crate::traits::RpcHandler;
use crate::util;

/// Maps `register`, `peers` and `closing` onto the registry. Membership is
/// global: a registration is visible to every later `peers` call.
#[derive(Debug, Clone, Default)]
pub struct RendezvousService {
    registry: Arc<Registry>,
}

impl RendezvousService {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

#[async_trait]
impl RpcHandler for RendezvousService {
    async fn handle(
        &self,
        caller: Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        debug!("rendezvous: {} from {}", method, caller.short());
        match method {
            Method::Register => {
                let identity = own_identity(caller, method, &payload)?;
                self.registry.register(identity);
                util::encode(&true)
            }
            Method::Peers => util::encode(&self.registry.list_peers()),
            Method::Closing => {
                let identity = own_identity(caller, method, &payload)?;
                self.registry.deregister(&identity);
                util::encode(&true)
            }
            other => Err(MarketError::Protocol(format!(
                "rendezvous does not serve {other}"
            ))),
        }
    }
}

/// A node may only (de)register itself.
fn own_identity(caller: Identity, method: Method, payload: &[u8]) -> MarketResult<Identity> {
    let identity = Identity::from_bytes(payload)?;
    if identity != caller {
        return Err(MarketError::Unauthorized(format!(
            "{} may not {method} on behalf of {}",
            caller.short(),
            identity.short()
        )));
    }
    Ok(identity)
}
