//! A participant: joins through the rendezvous service, sells through its
//! own [`AuctionCoordinator`] and bids on other sellers by remote call.

use std::sync::Arc;

use tracing::{info, warn};

use super::auction_coordinator::AuctionCoordinator;
use super::notifications::NotificationInbox;
use super::peer_view::PeerView;
use super::service::PeerService;
use crate::config::NodeConfig;
use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::marketplace::{AuctionOutcome, AuctionSnapshot};
use crate::rendezvous::RendezvousClient;
use crate::rpc::protocol::{Method, Notification};
use crate::rpc::RpcClient;
use crate::traits::{RpcHandler, RpcTransport, TimeProvider};

pub struct PeerNode<T: RpcTransport, C: TimeProvider> {
    identity: Identity,
    client: RpcClient<T>,
    rendezvous: RendezvousClient<T>,
    peers: PeerView,
    inbox: NotificationInbox,
    coordinator: Arc<AuctionCoordinator<T, C>>,
    deregister_on_close: bool,
}

impl<T: RpcTransport, C: TimeProvider> PeerNode<T, C> {
    /// Build the node. Nothing touches the network until [`Self::join`].
    pub fn new(transport: T, rendezvous: Identity, time: C, config: &NodeConfig) -> Self {
        let client = RpcClient::new(transport, config);
        let identity = client.identity();
        let rendezvous = RendezvousClient::new(client.clone(), rendezvous);
        let peers = PeerView::new(identity);
        let coordinator = Arc::new(AuctionCoordinator::new(
            client.clone(),
            rendezvous.clone(),
            peers.clone(),
            time,
        ));

        Self {
            identity,
            client,
            rendezvous,
            peers,
            inbox: NotificationInbox::new(config.inbox_capacity),
            coordinator,
            deregister_on_close: config.deregister_on_close,
        }
    }

    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Handler to mount on this node's endpoint. Must be serving before
    /// [`Self::join`], since other peers may call right after registration.
    pub fn service(&self) -> Arc<dyn RpcHandler> {
        Arc::new(PeerService::new(
            self.coordinator.clone(),
            self.inbox.clone(),
            self.peers.clone(),
        ))
    }

    /// Register with the rendezvous service and load the current peer list.
    ///
    /// A registration failure is returned as-is: a node that cannot be
    /// discovered cannot take part, and the caller should shut down. If the
    /// peer listing fails after registering, the registration is withdrawn
    /// so a failed join leaves nothing behind.
    pub async fn join(&self) -> MarketResult<Vec<Identity>> {
        self.rendezvous.register(&self.identity).await?;
        let peers = match self.refresh_peers().await {
            Ok(peers) => peers,
            Err(e) => {
                warn!("Peer listing failed after registering: {}", e);
                self.rendezvous.deregister_best_effort(&self.identity).await;
                return Err(e);
            }
        };
        info!("Joined with {} known peers", peers.len());
        Ok(peers)
    }

    pub async fn refresh_peers(&self) -> MarketResult<Vec<Identity>> {
        let listing = self.rendezvous.peers().await?;
        self.peers.replace(listing);
        Ok(self.peers.snapshot())
    }

    pub fn known_peers(&self) -> Vec<Identity> {
        self.peers.snapshot()
    }

    pub async fn open_auction(&self, item: &str) -> MarketResult<AuctionSnapshot> {
        self.coordinator.open_auction(item).await
    }

    pub async fn close_auction(&self) -> MarketResult<AuctionOutcome> {
        let outcome = self.coordinator.close_auction().await?;
        if self.deregister_on_close {
            self.coordinator.wait_for_broadcasts().await;
            self.rendezvous.deregister_best_effort(&self.identity).await;
        }
        Ok(outcome)
    }

    /// Bid on `seller`'s open auction. Not retried: a timed-out bid may
    /// already have been appended on the seller's side.
    pub async fn submit_bid(&self, seller: &Identity, amount: u64) -> MarketResult<()> {
        if seller == &self.identity {
            self.coordinator.submit_bid(self.identity, amount).await?;
            return Ok(());
        }
        let accepted: bool = self
            .client
            .call_typed(seller, Method::SubmitBid, &amount)
            .await?;
        if !accepted {
            return Err(MarketError::Protocol(format!(
                "seller {} refused the bid",
                seller.short()
            )));
        }
        info!("Bid {} on auction of {}", amount, seller.short());
        Ok(())
    }

    /// Poll a seller directly; the reliable counterpart of notifications.
    pub async fn auction_status(&self, seller: &Identity) -> MarketResult<Option<AuctionSnapshot>> {
        if seller == &self.identity {
            return Ok(self.coordinator.auction_status().await);
        }
        self.client
            .call_typed(seller, Method::GetAuctionStatus, &())
            .await
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inbox.all()
    }

    pub const fn inbox(&self) -> &NotificationInbox {
        &self.inbox
    }

    pub const fn coordinator(&self) -> &Arc<AuctionCoordinator<T, C>> {
        &self.coordinator
    }

    /// Let in-flight broadcasts finish, then leave the registry. A
    /// deregistration failure is logged; shutdown continues regardless.
    pub async fn shutdown(&self) {
        let reports = self.coordinator.wait_for_broadcasts().await;
        let failed: usize = reports.iter().map(|r| r.failed.len()).sum();
        if failed > 0 {
            warn!("{} notifications were not delivered before shutdown", failed);
        }
        self.rendezvous.deregister_best_effort(&self.identity).await;
        info!("Peer {} shut down", self.identity.short());
    }
}
