//! Remote-call abstraction: authenticated request/response delivery between
//! identities, plus the server-side handler seam.

use async_trait::async_trait;

use crate::crypto::Identity;
use crate::error::MarketResult;
use crate::rpc::protocol::Method;

/// Abstraction over the call transport.
///
/// Implementations deliver `payload` to the node reachable at `target` and
/// tell the receiving handler who the caller is. Timeouts and retries are
/// applied one layer up, by [`crate::rpc::RpcClient`].
#[async_trait]
pub trait RpcTransport: Send + Sync + Clone + 'static {
    /// Identity this transport signs outgoing calls with.
    fn local_identity(&self) -> Identity;

    /// Perform a request/response call.
    ///
    /// A remote handler failure is returned as the matching [`crate::MarketError`]
    /// variant; failing to reach the target is `PeerUnreachable`.
    async fn call(&self, target: &Identity, method: Method, payload: Vec<u8>)
        -> MarketResult<Vec<u8>>;

    /// One-way push. Returns once the message has been handed off; no
    /// acknowledgment from the receiver is awaited.
    async fn notify(&self, target: &Identity, payload: Vec<u8>) -> MarketResult<()>;
}

/// Server side of the remote-call surface. One invocation per incoming call;
/// invocations run concurrently.
#[async_trait]
pub trait RpcHandler: Send + Sync + 'static {
    async fn handle(&self, caller: Identity, method: Method, payload: Vec<u8>)
        -> MarketResult<Vec<u8>>;
}
