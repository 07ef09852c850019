//! Per-seller auction state machine.
//!
//! ```text
//! Created --open--> Open --submit_bid--> Open --close--> Closed
//! ```
//!
//! `Closed` is terminal. Selling again means building a new [`Auction`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bid::{highest_bid, Bid};
use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Created,
    Open,
    Closed,
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Result of closing an auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionOutcome {
    Winner(Bid),
    NoBids,
}

impl AuctionOutcome {
    pub const fn winner(&self) -> Option<&Bid> {
        match self {
            Self::Winner(bid) => Some(bid),
            Self::NoBids => None,
        }
    }
}

impl fmt::Display for AuctionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(bid) => write!(f, "won by {} for {}", bid.bidder.short(), bid.amount),
            Self::NoBids => write!(f, "no bids"),
        }
    }
}

/// Read-only view served to `getAuctionStatus` callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub seller: Identity,
    pub item: String,
    pub status: AuctionStatus,
    pub high_bid: Option<Bid>,
    pub bid_count: usize,
    /// Only set once the auction is closed.
    pub outcome: Option<AuctionOutcome>,
}

/// An auction owned by the seller's node.
#[derive(Debug, Clone)]
pub struct Auction {
    seller: Identity,
    item: String,
    status: AuctionStatus,
    bids: Vec<Bid>,
    outcome: Option<AuctionOutcome>,
}

impl Auction {
    pub fn new(seller: Identity, item: impl Into<String>) -> Self {
        Self {
            seller,
            item: item.into(),
            status: AuctionStatus::Created,
            bids: Vec::new(),
            outcome: None,
        }
    }

    pub const fn seller(&self) -> &Identity {
        &self.seller
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub const fn status(&self) -> AuctionStatus {
        self.status
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub const fn outcome(&self) -> Option<&AuctionOutcome> {
        self.outcome.as_ref()
    }

    pub fn high_bid(&self) -> Option<&Bid> {
        highest_bid(&self.bids)
    }

    pub fn open(&mut self) -> MarketResult<()> {
        if self.status != AuctionStatus::Created {
            return Err(MarketError::AlreadyOpen);
        }
        self.status = AuctionStatus::Open;
        Ok(())
    }

    /// Append a bid with the next sequence number.
    pub fn submit_bid(&mut self, bidder: Identity, amount: u64, now: u64) -> MarketResult<Bid> {
        if bidder == self.seller {
            return Err(MarketError::SelfBiddingNotAllowed);
        }
        if self.status != AuctionStatus::Open {
            return Err(MarketError::AuctionNotOpen);
        }
        if amount == 0 {
            return Err(MarketError::NonPositiveAmount);
        }

        let bid = Bid {
            bidder,
            amount,
            sequence: self.bids.len() as u64 + 1,
            received_at: now,
        };
        self.bids.push(bid.clone());
        Ok(bid)
    }

    /// Resolve the auction. The outcome is fixed here and never recomputed.
    pub fn close(&mut self) -> MarketResult<AuctionOutcome> {
        if self.status != AuctionStatus::Open {
            return Err(MarketError::AuctionNotOpen);
        }
        let outcome = match self.high_bid() {
            Some(bid) => AuctionOutcome::Winner(bid.clone()),
            None => AuctionOutcome::NoBids,
        };
        self.status = AuctionStatus::Closed;
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            seller: self.seller,
            item: self.item.clone(),
            status: self.status,
            high_bid: self.high_bid().cloned(),
            bid_count: self.bids.len(),
            outcome: self.outcome.clone(),
        }
    }
}
