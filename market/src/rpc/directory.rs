//! Shared-directory stand-in for the DHT collaborator.
//!
//! Each announced identity gets one CBOR record named after its hex
//! identity. Processes on one machine (or sharing a mounted directory) can
//! resolve each other through it.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crypto::Identity;
use crate::error::{MarketError, MarketResult};
use crate::traits::{DhtResolver, TimeProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EndpointRecord {
    endpoint: SocketAddr,
    announced_by: Identity,
    announced_at: u64,
}

impl EndpointRecord {
    fn to_cbor(&self) -> MarketResult<Vec<u8>> {
        let mut buffer = Vec::new();
        ciborium::into_writer(self, &mut buffer)
            .map_err(|e| MarketError::Serialization(format!("CBOR serialization failed: {e}")))?;
        Ok(buffer)
    }

    fn from_cbor(data: &[u8]) -> MarketResult<Self> {
        ciborium::from_reader(data)
            .map_err(|e| MarketError::Serialization(format!("CBOR deserialization failed: {e}")))
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryDht<C: TimeProvider> {
    root: PathBuf,
    time: C,
}

impl<C: TimeProvider> DirectoryDht<C> {
    pub async fn open(root: impl AsRef<Path>, time: C) -> MarketResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            MarketError::Storage(format!("failed to create {}: {e}", root.display()))
        })?;
        Ok(Self { root, time })
    }

    fn record_path(&self, identity: &Identity) -> PathBuf {
        self.root.join(format!("{}.cbor", identity.to_hex()))
    }
}

#[async_trait]
impl<C: TimeProvider> DhtResolver for DirectoryDht<C> {
    async fn announce(
        &self,
        identity: &Identity,
        endpoint: SocketAddr,
        announcer: &Identity,
    ) -> MarketResult<()> {
        let record = EndpointRecord {
            endpoint,
            announced_by: *announcer,
            announced_at: self.time.now_unix(),
        };
        let path = self.record_path(identity);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, record.to_cbor()?)
            .await
            .map_err(|e| MarketError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| MarketError::Storage(format!("failed to publish {}: {e}", path.display())))?;
        debug!("Announced {} at {}", identity.short(), endpoint);
        Ok(())
    }

    async fn resolve(&self, identity: &Identity) -> MarketResult<Option<SocketAddr>> {
        let path = self.record_path(identity);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MarketError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        match EndpointRecord::from_cbor(&data) {
            Ok(record) => Ok(Some(record.endpoint)),
            Err(e) => {
                warn!("Ignoring corrupt endpoint record for {}: {}", identity.short(), e);
                Ok(None)
            }
        }
    }

    async fn withdraw(&self, identity: &Identity) -> MarketResult<()> {
        match tokio::fs::remove_file(self.record_path(identity)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MarketError::Storage(format!("failed to withdraw: {e}"))),
        }
    }
}
