//! Authoritative, deduplicated membership set kept by the rendezvous node.

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::crypto::Identity;

#[derive(Debug, Default)]
struct Membership {
    /// Registration order, no duplicates.
    peers: Vec<Identity>,
    /// Bumped on every effective change.
    version: u64,
}

/// Consistent copy of the membership set at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub peers: Vec<Identity>,
    pub version: u64,
}

/// Membership set behind a single-writer lock.
///
/// Mutations serialize on the write lock; `list_peers` clones under the read
/// lock, so a reader sees either all or none of a concurrent mutation.
#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<Membership>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `identity` if absent. Returns `true` if it was newly added.
    pub fn register(&self, identity: Identity) -> bool {
        let mut membership = self.inner.write();
        if membership.peers.contains(&identity) {
            debug!("Peer {} already registered", identity.short());
            return false;
        }
        membership.peers.push(identity);
        membership.version += 1;
        info!(
            "Registered peer {} ({} known)",
            identity.short(),
            membership.peers.len()
        );
        true
    }

    /// Remove `identity` if present. Returns `true` if it was removed.
    pub fn deregister(&self, identity: &Identity) -> bool {
        let mut membership = self.inner.write();
        let before = membership.peers.len();
        membership.peers.retain(|peer| peer != identity);
        if membership.peers.len() == before {
            debug!("Peer {} was not registered", identity.short());
            return false;
        }
        membership.version += 1;
        info!(
            "Deregistered peer {} ({} known)",
            identity.short(),
            membership.peers.len()
        );
        true
    }

    pub fn list_peers(&self) -> Vec<Identity> {
        self.inner.read().peers.clone()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let membership = self.inner.read();
        RegistrySnapshot {
            peers: membership.peers.clone(),
            version: membership.version,
        }
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.inner.read().peers.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.inner.read().peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
