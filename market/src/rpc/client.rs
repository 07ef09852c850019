//! Caller side of the remote-call surface: timeouts, retries and typed
//! encoding on top of any [`RpcTransport`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::protocol::Method;
use crate::config::NodeConfig;
use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::traits::RpcTransport;
use crate::util;

#[derive(Clone)]
pub struct RpcClient<T: RpcTransport> {
    transport: T,
    call_timeout: Duration,
    notify_timeout: Duration,
    max_retries: u32,
    retry_initial_delay: Duration,
}

impl<T: RpcTransport> RpcClient<T> {
    pub fn new(transport: T, config: &NodeConfig) -> Self {
        Self {
            transport,
            call_timeout: config.call_timeout,
            notify_timeout: config.notify_timeout,
            max_retries: config.max_retries.max(1),
            retry_initial_delay: config.retry_initial_delay,
        }
    }

    pub fn identity(&self) -> Identity {
        self.transport.local_identity()
    }

    /// Single attempt, bounded by the call timeout.
    pub async fn call(
        &self,
        target: &Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        match tokio::time::timeout(
            self.call_timeout,
            self.transport.call(target, method, payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(MarketError::Timeout(self.call_timeout.as_millis() as u64)),
        }
    }

    /// Retry retryable failures with exponential backoff. Only used for
    /// methods that are safe to repeat.
    pub async fn call_with_retry(
        &self,
        target: &Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        debug_assert!(method.is_idempotent(), "{method} must not be retried");
        let mut retry_delay = self.retry_initial_delay;

        for attempt in 1..=self.max_retries {
            match self.call(target, method, payload.clone()).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!(
                        "{} to {} failed ({}), retrying in {:?} (attempt {}/{})",
                        method,
                        target.short(),
                        e,
                        retry_delay,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(retry_delay).await;
                    retry_delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }

        Err(MarketError::PeerUnreachable(format!(
            "{method} to {} failed after {} attempts",
            target.short(),
            self.max_retries
        )))
    }

    /// Encode the request, call, decode the reply.
    pub async fn call_typed<Req, Resp>(
        &self,
        target: &Identity,
        method: Method,
        request: &Req,
    ) -> MarketResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let payload = util::encode(request)?;
        let reply = if method.is_idempotent() {
            self.call_with_retry(target, method, payload).await?
        } else {
            self.call(target, method, payload).await?
        };
        util::decode(&reply)
    }

    /// Fire-and-forget push, bounded by the notify timeout so one slow
    /// receiver cannot hold the sender.
    pub async fn notify(&self, target: &Identity, payload: Vec<u8>) -> MarketResult<()> {
        match tokio::time::timeout(self.notify_timeout, self.transport.notify(target, payload))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                debug!("notify to {} timed out", target.short());
                Err(MarketError::Timeout(self.notify_timeout.as_millis() as u64))
            }
        }
    }
}
