//! A peer's local view of the other registered nodes.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::crypto::Identity;

/// Known peers, never including ourselves. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct PeerView {
    own: Identity,
    peers: Arc<RwLock<Vec<Identity>>>,
}

impl PeerView {
    pub fn new(own: Identity) -> Self {
        Self {
            own,
            peers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replace the view with a fresh rendezvous listing. Returns the new size.
    pub fn replace(&self, listing: Vec<Identity>) -> usize {
        let mut fresh: Vec<Identity> = Vec::with_capacity(listing.len());
        for identity in listing {
            if identity != self.own && !fresh.contains(&identity) {
                fresh.push(identity);
            }
        }
        let count = fresh.len();
        *self.peers.write() = fresh;
        count
    }

    /// Returns `true` if the peer was not known yet.
    pub fn insert(&self, identity: Identity) -> bool {
        if identity == self.own {
            return false;
        }
        let mut peers = self.peers.write();
        if peers.contains(&identity) {
            return false;
        }
        peers.push(identity);
        true
    }

    pub fn snapshot(&self) -> Vec<Identity> {
        self.peers.read().clone()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.peers.read().contains(identity)
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
