//! TCP transport: one connection per call, length-prefixed frames, every
//! request signed by the caller.
//!
//! ```text
//! frame   := u32 big-endian length || bytes
//! request := SignedEnvelope { bincode(RpcRequest) }
//! reply   := bincode(RpcReply)            (not sent for notify)
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::protocol::{Method, RpcReply, RpcRequest};
use crate::config::{DEFAULT_CALL_TIMEOUT_MS, MAX_FRAME_SIZE, MAX_TIMESTAMP_DRIFT_SECS};
use crate::crypto::{Identity, NodeKeypair, SignedEnvelope};
use crate::error::{MarketError, MarketResult, RemoteError};
use crate::traits::{DhtResolver, RpcHandler, RpcTransport, TimeProvider};
use crate::util;

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> MarketResult<()> {
    if data.len() > MAX_FRAME_SIZE {
        return Err(MarketError::Protocol(format!(
            "frame too large: {} bytes (max {MAX_FRAME_SIZE})",
            data.len()
        )));
    }
    writer
        .write_u32(data.len() as u32)
        .await
        .map_err(|e| MarketError::PeerUnreachable(format!("write failed: {e}")))?;
    writer
        .write_all(data)
        .await
        .map_err(|e| MarketError::PeerUnreachable(format!("write failed: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| MarketError::PeerUnreachable(format!("flush failed: {e}")))
}

async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> MarketResult<Vec<u8>> {
    let len = reader
        .read_u32()
        .await
        .map_err(|e| MarketError::PeerUnreachable(format!("read failed: {e}")))?
        as usize;
    if len > MAX_FRAME_SIZE {
        return Err(MarketError::Protocol(format!(
            "frame too large: {len} bytes (max {MAX_FRAME_SIZE})"
        )));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| MarketError::PeerUnreachable(format!("read failed: {e}")))?;
    Ok(buf)
}

/// [`read_frame`] that gives up once `deadline` passes, so a silent sender
/// cannot hold a server task open.
async fn read_frame_within<R: AsyncRead + Unpin>(
    reader: &mut R,
    deadline: Duration,
) -> MarketResult<Vec<u8>> {
    tokio::time::timeout(deadline, read_frame(reader))
        .await
        .map_err(|_| MarketError::Timeout(deadline.as_millis() as u64))?
}

/// Validate that a request timestamp is within acceptable drift of the current time.
pub const fn validate_timestamp(message_timestamp: u64, current_time: u64) -> bool {
    message_timestamp.abs_diff(current_time) <= MAX_TIMESTAMP_DRIFT_SECS
}

/// Caller side: resolves the target through the DHT and signs each request.
#[derive(Clone)]
pub struct TcpTransport<D: DhtResolver, C: TimeProvider> {
    keypair: NodeKeypair,
    dht: D,
    time: C,
}

impl<D: DhtResolver, C: TimeProvider> TcpTransport<D, C> {
    pub fn new(keypair: NodeKeypair, dht: D, time: C) -> Self {
        Self { keypair, dht, time }
    }

    async fn send_request(
        &self,
        target: &Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<TcpStream> {
        let addr = self.dht.resolve(target).await?.ok_or_else(|| {
            MarketError::PeerUnreachable(format!("no endpoint published for {}", target.short()))
        })?;

        let mut stream = TcpStream::connect(addr).await.map_err(|e| {
            MarketError::PeerUnreachable(format!("connect to {} at {addr}: {e}", target.short()))
        })?;

        let request = RpcRequest {
            method,
            target: *target,
            payload,
            timestamp: self.time.now_unix(),
        };
        let envelope = SignedEnvelope::sign(util::encode(&request)?, &self.keypair);
        write_frame(&mut stream, &envelope.to_bytes()?).await?;
        Ok(stream)
    }
}

#[async_trait]
impl<D: DhtResolver, C: TimeProvider> RpcTransport for TcpTransport<D, C> {
    fn local_identity(&self) -> Identity {
        self.keypair.identity()
    }

    async fn call(
        &self,
        target: &Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        let mut stream = self.send_request(target, method, payload).await?;
        let reply: RpcReply = util::decode(&read_frame(&mut stream).await?)?;
        match reply {
            RpcReply::Ok(data) => Ok(data),
            RpcReply::Err(remote) => Err(remote.into()),
        }
    }

    async fn notify(&self, target: &Identity, payload: Vec<u8>) -> MarketResult<()> {
        let mut stream = self.send_request(target, Method::Notify, payload).await?;
        // Half-close so the receiver sees the end of the request; no reply is read.
        let _ = stream.shutdown().await;
        Ok(())
    }
}

/// Accepts connections and hands each request to an [`RpcHandler`] on its
/// own task.
pub struct RpcServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RpcServer {
    /// Bind `addr` and start serving until `shutdown` is cancelled.
    pub async fn start<C: TimeProvider>(
        addr: SocketAddr,
        identity: Identity,
        handler: Arc<dyn RpcHandler>,
        time: C,
        shutdown: CancellationToken,
    ) -> MarketResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| MarketError::Config(format!("failed to bind {addr}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| MarketError::Config(format!("no local address: {e}")))?;
        info!("RPC server for {} listening on {}", identity.short(), local_addr);

        let handle = tokio::spawn(accept_loop(listener, identity, handler, time, shutdown));
        Ok(Self { local_addr, handle })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the accept loop to exit after shutdown was signalled.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!("RPC accept loop failed: {}", e);
        }
    }
}

async fn accept_loop<C: TimeProvider>(
    listener: TcpListener,
    identity: Identity,
    handler: Arc<dyn RpcHandler>,
    time: C,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("RPC server for {} shutting down", identity.short());
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    let handler = handler.clone();
                    let time = time.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, identity, handler, time).await {
                            debug!("Connection from {} ended with error: {}", peer_addr, e);
                        }
                    });
                }
                Err(e) => warn!("Accept failed: {}", e),
            }
        }
    }
}

async fn serve_connection<C: TimeProvider>(
    mut stream: TcpStream,
    identity: Identity,
    handler: Arc<dyn RpcHandler>,
    time: C,
) -> MarketResult<()> {
    let frame =
        read_frame_within(&mut stream, Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS)).await?;
    let (payload, caller) = SignedEnvelope::verify_and_unwrap(&frame)?;
    let request: RpcRequest = util::decode(&payload)?;

    let result = if request.target != identity {
        Err(MarketError::Unauthorized(format!(
            "request addressed to {}",
            request.target.short()
        )))
    } else if !validate_timestamp(request.timestamp, time.now_unix()) {
        Err(MarketError::Unauthorized(format!(
            "request timestamp {} outside allowed drift",
            request.timestamp
        )))
    } else {
        handler.handle(caller, request.method, request.payload).await
    };

    if request.method == Method::Notify {
        if let Err(e) = result {
            debug!("Dropped notify from {}: {}", caller.short(), e);
        }
        return Ok(());
    }

    let reply = match result {
        Ok(data) => RpcReply::Ok(data),
        Err(e) => {
            debug!("{} from {} failed: {}", request.method, caller.short(), e);
            RpcReply::Err(RemoteError::from(&e))
        }
    };
    write_frame(&mut stream, &util::encode(&reply)?).await
}
