//! Seller-side owner of the auction state machine.
//!
//! [`AuctionCoordinator`] holds at most one [`Auction`] for this node's
//! identity, serializes every mutation on it, and pushes a notification to
//! the known peers after each state change.

use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::peer_view::PeerView;
use crate::config::MAX_ITEM_LEN;
use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::marketplace::{Auction, AuctionOutcome, AuctionSnapshot, AuctionStatus, Bid};
use crate::rendezvous::RendezvousClient;
use crate::rpc::protocol::{AuctionEvent, Notification};
use crate::rpc::RpcClient;
use crate::traits::{RpcTransport, TimeProvider};

mod broadcast;

pub use broadcast::BroadcastReport;

/// Coordinates this node's auction as seller.
///
/// # Lock ordering
///
/// `auction` is never held across a network call: the notification for a
/// change is built under the lock and broadcast after it is released.
/// `broadcasts` is a plain mutex only ever held to push or drain handles.
pub struct AuctionCoordinator<T: RpcTransport, C: TimeProvider> {
    pub(super) identity: Identity,
    pub(super) client: RpcClient<T>,
    pub(super) rendezvous: RendezvousClient<T>,
    pub(super) peers: PeerView,
    pub(super) time: C,
    /// Current (or last closed) auction. Write lock = single writer.
    auction: RwLock<Option<Auction>>,
    /// In-flight notification broadcasts.
    broadcasts: Mutex<Vec<JoinHandle<BroadcastReport>>>,
}

impl<T: RpcTransport, C: TimeProvider> AuctionCoordinator<T, C> {
    pub fn new(
        client: RpcClient<T>,
        rendezvous: RendezvousClient<T>,
        peers: PeerView,
        time: C,
    ) -> Self {
        Self {
            identity: client.identity(),
            client,
            rendezvous,
            peers,
            time,
            auction: RwLock::new(None),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Start selling `item`. A closed previous auction is replaced by a
    /// fresh one; an open one makes this fail with `AlreadyOpen`.
    pub async fn open_auction(&self, item: &str) -> MarketResult<AuctionSnapshot> {
        if item.len() > MAX_ITEM_LEN {
            return Err(MarketError::InvalidItem(format!(
                "item is {} bytes (max {MAX_ITEM_LEN})",
                item.len()
            )));
        }
        let snapshot = {
            let mut slot = self.auction.write().await;
            if let Some(current) = slot.as_ref() {
                if current.status() != AuctionStatus::Closed {
                    return Err(MarketError::AlreadyOpen);
                }
                debug!("Disposing closed auction for '{}'", current.item());
            }
            let mut auction = Auction::new(self.identity, item);
            auction.open()?;
            let snapshot = auction.snapshot();
            *slot = Some(auction);
            snapshot
        };

        info!("Opened auction for '{}'", snapshot.item);
        self.broadcast(self.notification(&snapshot.item, AuctionEvent::Opened));
        Ok(snapshot)
    }

    /// Accept a bid from an authenticated caller.
    pub async fn submit_bid(&self, bidder: Identity, amount: u64) -> MarketResult<Bid> {
        let (bid, notification) = {
            let mut slot = self.auction.write().await;
            let Some(auction) = slot.as_mut() else {
                return Err(if bidder == self.identity {
                    MarketError::SelfBiddingNotAllowed
                } else {
                    MarketError::AuctionNotOpen
                });
            };
            let bid = auction.submit_bid(bidder, amount, self.time.now_unix())?;
            let high_bid = auction.high_bid().cloned().unwrap_or_else(|| bid.clone());
            info!(
                "Accepted bid #{} of {} from {} on '{}'",
                bid.sequence,
                bid.amount,
                bidder.short(),
                auction.item()
            );
            let event = AuctionEvent::NewBid {
                bid: bid.clone(),
                high_bid,
            };
            (bid, self.notification(auction.item(), event))
        };

        self.broadcast(notification);
        Ok(bid)
    }

    /// Resolve the open auction and announce the result.
    pub async fn close_auction(&self) -> MarketResult<AuctionOutcome> {
        let (item, outcome) = {
            let mut slot = self.auction.write().await;
            let auction = slot.as_mut().ok_or(MarketError::AuctionNotOpen)?;
            let outcome = auction.close()?;
            (auction.item().to_string(), outcome)
        };

        info!("Closed auction for '{}': {}", item, outcome);
        self.broadcast(self.notification(
            &item,
            AuctionEvent::Closed {
                outcome: outcome.clone(),
            },
        ));
        Ok(outcome)
    }

    /// Read-only view for `getAuctionStatus`. `None` if this node never sold.
    pub async fn auction_status(&self) -> Option<AuctionSnapshot> {
        self.auction.read().await.as_ref().map(Auction::snapshot)
    }

    fn notification(&self, item: &str, event: AuctionEvent) -> Notification {
        Notification {
            seller: self.identity,
            item: item.to_string(),
            event,
            timestamp: self.time.now_unix(),
        }
    }
}
