//! Trait abstractions for dependency injection and testability.
//!
//! The DHT, the seed store and the call transport are external collaborators;
//! the core only talks to them through these traits so it can be unit tested
//! without sockets or disks.

pub mod dht;
pub mod random;
pub mod store;
pub mod time;
pub mod transport;

// Re-export all traits for crate-internal use.
// The public API surface is controlled by lib.rs re-exports.
pub use dht::DhtResolver;
pub use random::RandomSource;
pub use store::KeyValueStore;
pub use time::TimeProvider;
pub use transport::{RpcHandler, RpcTransport};

// Re-export default implementations
pub use random::OsRandom;
pub use time::SystemTimeProvider;
