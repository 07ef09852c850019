//! Peer node: local peer view, notification inbox, seller-side auction
//! coordination and the remote-call service tying them together.

pub mod auction_coordinator;
pub mod commands;
pub mod notifications;
pub mod peer_node;
pub mod peer_view;
pub mod service;

pub use auction_coordinator::{AuctionCoordinator, BroadcastReport};
pub use commands::UserCommand;
pub use notifications::NotificationInbox;
pub use peer_node::PeerNode;
pub use peer_view::PeerView;
pub use service::PeerService;
