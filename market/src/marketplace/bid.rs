use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;

/// A bid as accepted by the seller's node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Authenticated caller that submitted the bid
    pub bidder: Identity,

    /// Bid amount in the smallest currency unit
    pub amount: u64,

    /// Arrival order on the seller's node, starting at 1
    pub sequence: u64,

    /// Unix timestamp when the seller accepted the bid
    pub received_at: u64,
}

impl Bid {
    /// Ranking used for winner determination: higher amount first, then the
    /// earlier sequence number. `Ordering::Greater` means `self` wins.
    pub fn rank(&self, other: &Self) -> Ordering {
        self.amount
            .cmp(&other.amount)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }

    pub fn outranks(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Greater
    }
}

/// Pick the winning bid out of `bids`, or `None` if there are none.
pub fn highest_bid<'a, I>(bids: I) -> Option<&'a Bid>
where
    I: IntoIterator<Item = &'a Bid>,
{
    bids.into_iter().max_by(|a, b| a.rank(b))
}
