//! Remote-call surface of a peer node.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::auction_coordinator::AuctionCoordinator;
use super::notifications::NotificationInbox;
use super::peer_view::PeerView;
use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::rpc::protocol::{Method, Notification};
use crate::traits::{RpcHandler, RpcTransport, TimeProvider};
use crate::util;

pub struct PeerService<T: RpcTransport, C: TimeProvider> {
    coordinator: Arc<AuctionCoordinator<T, C>>,
    inbox: NotificationInbox,
    peers: PeerView,
}

impl<T: RpcTransport, C: TimeProvider> PeerService<T, C> {
    pub const fn new(
        coordinator: Arc<AuctionCoordinator<T, C>>,
        inbox: NotificationInbox,
        peers: PeerView,
    ) -> Self {
        Self {
            coordinator,
            inbox,
            peers,
        }
    }

    /// Seller-local methods are only accepted from this node's own identity.
    fn check_caller(&self, caller: &Identity, method: Method) -> MarketResult<()> {
        if !method.is_seller_local() || caller == self.coordinator.identity() {
            Ok(())
        } else {
            warn!("Rejected {} from {}", method, caller.short());
            Err(MarketError::Unauthorized(format!(
                "{method} may only be called by the seller itself"
            )))
        }
    }
}

#[async_trait]
impl<T: RpcTransport, C: TimeProvider> RpcHandler for PeerService<T, C> {
    async fn handle(
        &self,
        caller: Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        debug!("peer: {} from {}", method, caller.short());
        self.check_caller(&caller, method)?;
        match method {
            Method::SubmitBid => {
                let amount: u64 = util::decode(&payload)?;
                self.coordinator.submit_bid(caller, amount).await?;
                util::encode(&true)
            }
            Method::GetAuctionStatus => util::encode(&self.coordinator.auction_status().await),
            Method::Notify => {
                let notification: Notification = util::decode(&payload)?;
                // Only the seller itself may speak for its auction.
                if notification.seller != caller {
                    return Err(MarketError::Unauthorized(format!(
                        "notification for {} sent by {}",
                        notification.seller.short(),
                        caller.short()
                    )));
                }
                self.peers.insert(caller);
                self.inbox.push(notification);
                Ok(Vec::new())
            }
            Method::OpenAuction => {
                let item: String = util::decode(&payload)?;
                let snapshot = self.coordinator.open_auction(&item).await?;
                util::encode(&snapshot.status)
            }
            Method::CloseAuction => util::encode(&self.coordinator.close_auction().await?),
            Method::Register | Method::Peers | Method::Closing => Err(MarketError::Protocol(
                format!("peer nodes do not serve {method}"),
            )),
        }
    }
}
