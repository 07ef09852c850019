//! Remote-call plumbing: wire protocol, caller-side timeouts and retries,
//! and the TCP transport with its directory-based endpoint resolver.

pub mod client;
pub mod directory;
pub mod protocol;
pub mod tcp;

pub use client::RpcClient;
pub use directory::DirectoryDht;
pub use protocol::{AuctionEvent, Method, Notification, RpcReply, RpcRequest};
pub use tcp::{RpcServer, TcpTransport};
