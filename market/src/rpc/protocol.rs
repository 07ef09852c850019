//! Remote-call method names and the messages carried by each.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::error::RemoteError;
use crate::marketplace::{AuctionOutcome, Bid};

/// Every method exposed on the remote-call surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// peer → rendezvous: identity bytes → bool
    Register,
    /// peer → rendezvous: () → identities
    Peers,
    /// peer → rendezvous: identity bytes → bool
    Closing,
    /// seller → self: item description → status
    OpenAuction,
    /// bidder → seller: amount → bool
    SubmitBid,
    /// seller → self: () → outcome
    CloseAuction,
    /// any → seller: () → optional snapshot
    GetAuctionStatus,
    /// seller → peers, one-way
    Notify,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Peers => "peers",
            Self::Closing => "closing",
            Self::OpenAuction => "openAuction",
            Self::SubmitBid => "submitBid",
            Self::CloseAuction => "closeAuction",
            Self::GetAuctionStatus => "getAuctionStatus",
            Self::Notify => "notify",
        }
    }

    /// Methods only the owning node may invoke on itself.
    pub const fn is_seller_local(self) -> bool {
        matches!(self, Self::OpenAuction | Self::CloseAuction)
    }

    /// Safe to repeat after a timeout without changing the outcome.
    pub const fn is_idempotent(self) -> bool {
        matches!(
            self,
            Self::Register | Self::Peers | Self::Closing | Self::GetAuctionStatus
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request as it travels inside a [`crate::crypto::SignedEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: Method,
    /// Intended receiver; a server refuses requests addressed to someone else.
    pub target: Identity,
    pub payload: Vec<u8>,
    /// Unix seconds at signing time.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RpcReply {
    Ok(Vec<u8>),
    Err(RemoteError),
}

/// Auction events pushed through `notify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    Opened,
    NewBid { bid: Bid, high_bid: Bid },
    Closed { outcome: AuctionOutcome },
}

/// Payload of a `notify` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub seller: Identity,
    pub item: String,
    pub event: AuctionEvent,
    pub timestamp: u64,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seller = self.seller.short();
        match &self.event {
            AuctionEvent::Opened => write!(f, "[{seller}] auction opened: {}", self.item),
            AuctionEvent::NewBid { bid, high_bid } => write!(
                f,
                "[{seller}] new bid on {}: {} from {} (high bid {})",
                self.item,
                bid.amount,
                bid.bidder.short(),
                high_bid.amount
            ),
            AuctionEvent::Closed { outcome } => {
                write!(f, "[{seller}] auction closed: {} {outcome}", self.item)
            }
        }
    }
}
