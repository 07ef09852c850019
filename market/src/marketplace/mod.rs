pub mod auction;
pub mod bid;

pub use auction::{Auction, AuctionOutcome, AuctionSnapshot, AuctionStatus};
pub use bid::{highest_bid, Bid};
