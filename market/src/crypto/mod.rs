//! Node identities, signed request envelopes and persisted seed material.
//!
//! Every node is identified by an Ed25519 verifying key derived from a
//! 32-byte seed that is generated once and kept in the node's key-value
//! store. Outgoing requests are signed with the matching signing key so the
//! receiving side learns the caller's [`Identity`] without trusting the payload.

pub mod envelope;
pub mod identity;
pub mod seeds;

pub use envelope::SignedEnvelope;
pub use identity::{Identity, NodeKeypair, IDENTITY_LEN};
pub use seeds::{resolve_seed, NodeRole, SessionSeeds};
