//! Mock implementations for testing.
//!
//! In-memory stand-ins for the external collaborators (network, DHT, seed
//! store, clock, randomness) so nodes can be exercised without sockets or
//! disks.

pub mod dht;
pub mod random;
pub mod store;
pub mod time;
pub mod transport;

pub use dht::MockDirectory;
pub use random::MockRandom;
pub use store::MockStore;
pub use time::MockTime;
pub use transport::{MockNetwork, MockTransport, RecordedCall};

use crate::crypto::{Identity, NodeKeypair};

/// Deterministic keypair for tests; distinct `n` give distinct identities.
pub fn test_keypair(n: u8) -> NodeKeypair {
    NodeKeypair::from_seed(&[n; 32])
}

pub fn test_identity(n: u8) -> Identity {
    test_keypair(n).identity()
}
