pub mod config;
pub mod crypto;
pub mod error;
pub mod marketplace;
pub mod node;
pub mod rendezvous;
pub mod rpc;
pub mod storage;
pub mod traits;
pub mod util;

#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use config::*;
pub use crypto::{Identity, NodeKeypair, NodeRole, SessionSeeds, SignedEnvelope};
pub use error::{ErrorKind, MarketError, MarketResult, RemoteError};
pub use marketplace::{Auction, AuctionOutcome, AuctionSnapshot, AuctionStatus, Bid};
pub use node::{AuctionCoordinator, BroadcastReport, NotificationInbox, PeerNode, PeerView};
pub use rendezvous::{Registry, RegistrySnapshot, RendezvousClient, RendezvousService};
pub use rpc::{AuctionEvent, DirectoryDht, Method, Notification, RpcClient, RpcServer, TcpTransport};
pub use storage::FileStore;
pub use traits::{
    DhtResolver, KeyValueStore, OsRandom, RandomSource, RpcHandler, RpcTransport,
    SystemTimeProvider, TimeProvider,
};
