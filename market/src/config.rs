//! Configuration constants and node settings.
//!
//! This module centralizes magic numbers and configuration values
//! to improve maintainability and enable easier tuning. Every value in
//! [`NodeConfig`] can be overridden through an `AUCTION_*` environment
//! variable.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MarketError, MarketResult};

/// Timeout applied to every outgoing remote call.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Timeout for a single fire-and-forget notification send.
pub const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 2_000;

/// Maximum attempts for idempotent rendezvous calls.
pub const RENDEZVOUS_MAX_RETRIES: u32 = 5;

/// Initial delay for rendezvous retry (doubles on each retry).
pub const RENDEZVOUS_INITIAL_DELAY_MS: u64 = 100;

/// Largest frame accepted on the wire.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Longest item name, in bytes, an auction may be opened for. Keeps every
/// snapshot and notification well inside [`MAX_FRAME_SIZE`].
pub const MAX_ITEM_LEN: usize = 4 * 1024;

/// Maximum allowed clock drift for signed request timestamps (5 minutes).
pub const MAX_TIMESTAMP_DRIFT_SECS: u64 = 300;

/// Notifications kept in a node's inbox before the oldest are evicted.
pub const NOTIFICATION_INBOX_CAP: usize = 256;

/// Length of every persisted seed.
pub const SEED_LEN: usize = 32;

/// Well-known keys in the node's key-value store.
pub mod seed_keys {
    /// DHT identity seed of the rendezvous node.
    pub const RENDEZVOUS_DHT: &str = "dht-seed";
    /// DHT identity seed of a regular peer.
    pub const PEER_DHT: &str = "dht-seed-bootstrap";
    /// Remote-call identity seed (both roles).
    pub const RPC: &str = "rpc-seed";
}

/// Environment variable overrides.
pub mod env {
    pub const CALL_TIMEOUT_MS: &str = "AUCTION_CALL_TIMEOUT_MS";
    pub const NOTIFY_TIMEOUT_MS: &str = "AUCTION_NOTIFY_TIMEOUT_MS";
    pub const MAX_RETRIES: &str = "AUCTION_MAX_RETRIES";
    pub const DATA_DIR: &str = "AUCTION_DATA_DIR";
    pub const DIRECTORY: &str = "AUCTION_DIRECTORY";
    pub const DEREGISTER_ON_CLOSE: &str = "AUCTION_DEREGISTER_ON_CLOSE";
}

/// Runtime settings shared by the rendezvous and peer roles.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub call_timeout: Duration,
    pub notify_timeout: Duration,
    pub max_retries: u32,
    pub retry_initial_delay: Duration,
    /// Where the seed store lives.
    pub data_dir: PathBuf,
    /// Shared directory used to resolve identities to endpoints.
    pub directory: PathBuf,
    /// Leave the rendezvous registry as soon as our own auction closes.
    pub deregister_on_close: bool,
    pub inbox_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let base_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            notify_timeout: Duration::from_millis(DEFAULT_NOTIFY_TIMEOUT_MS),
            max_retries: RENDEZVOUS_MAX_RETRIES,
            retry_initial_delay: Duration::from_millis(RENDEZVOUS_INITIAL_DELAY_MS),
            data_dir: base_dir.join("p2p-auction"),
            directory: std::env::temp_dir().join("p2p-auction-directory"),
            deregister_on_close: false,
            inbox_capacity: NOTIFICATION_INBOX_CAP,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by any `AUCTION_*` variables present.
    pub fn from_env() -> MarketResult<Self> {
        let mut config = Self::default();
        if let Some(ms) = parse_env::<u64>(env::CALL_TIMEOUT_MS)? {
            config.call_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env::<u64>(env::NOTIFY_TIMEOUT_MS)? {
            config.notify_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_env::<u32>(env::MAX_RETRIES)? {
            config.max_retries = retries;
        }
        if let Ok(dir) = std::env::var(env::DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(env::DIRECTORY) {
            config.directory = PathBuf::from(dir);
        }
        if let Some(flag) = parse_env::<bool>(env::DEREGISTER_ON_CLOSE)? {
            config.deregister_on_close = flag;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MarketResult<()> {
        if self.call_timeout.is_zero() {
            return Err(MarketError::Config("call timeout must be non-zero".into()));
        }
        if self.max_retries == 0 {
            return Err(MarketError::Config("max retries must be at least 1".into()));
        }
        if self.inbox_capacity == 0 {
            return Err(MarketError::Config("inbox capacity must be non-zero".into()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> MarketResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| MarketError::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
