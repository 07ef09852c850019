pub mod harness;

pub use harness::{fast_config, AuctionNetwork};
