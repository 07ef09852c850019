//! Generate-if-absent resolution of persisted seed material.

use tracing::{debug, info};

use super::identity::{Identity, NodeKeypair};
use crate::config::{seed_keys, SEED_LEN};
use crate::error::{MarketError, MarketResult};
use crate::traits::{KeyValueStore, RandomSource};

/// Look up `key` in the store; if absent, generate fresh random bytes and
/// persist them before returning.
pub async fn resolve_seed<S, R>(store: &S, rng: &R, key: &str) -> MarketResult<[u8; SEED_LEN]>
where
    S: KeyValueStore,
    R: RandomSource,
{
    if let Some(existing) = store.get(key).await? {
        let seed: [u8; SEED_LEN] = existing.as_slice().try_into().map_err(|_| {
            MarketError::Storage(format!(
                "seed '{key}' has {} bytes, expected {SEED_LEN}",
                existing.len()
            ))
        })?;
        debug!("Loaded seed '{}' from store", key);
        return Ok(seed);
    }

    let seed = rng.random_bytes_32();
    store.put(key, seed.to_vec()).await?;
    info!("Generated and stored new seed '{}'", key);
    Ok(seed)
}

/// Node role, which decides the well-known DHT seed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Rendezvous,
    Peer,
}

impl NodeRole {
    const fn dht_seed_key(self) -> &'static str {
        match self {
            Self::Rendezvous => seed_keys::RENDEZVOUS_DHT,
            Self::Peer => seed_keys::PEER_DHT,
        }
    }
}

/// Keys resolved once at startup and injected into the node.
#[derive(Debug, Clone)]
pub struct SessionSeeds {
    /// Identity the node uses towards the DHT collaborator.
    pub dht: NodeKeypair,
    /// Identity the node is reachable at for remote calls.
    pub rpc: NodeKeypair,
}

impl SessionSeeds {
    pub async fn load<S, R>(store: &S, rng: &R, role: NodeRole) -> MarketResult<Self>
    where
        S: KeyValueStore,
        R: RandomSource,
    {
        let dht_seed = resolve_seed(store, rng, role.dht_seed_key()).await?;
        let rpc_seed = resolve_seed(store, rng, seed_keys::RPC).await?;
        Ok(Self {
            dht: NodeKeypair::from_seed(&dht_seed),
            rpc: NodeKeypair::from_seed(&rpc_seed),
        })
    }

    pub fn rpc_identity(&self) -> Identity {
        self.rpc.identity()
    }

    pub fn dht_identity(&self) -> Identity {
        self.dht.identity()
    }
}
