//! Fire-and-forget notification fan-out.

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::AuctionCoordinator;
use crate::crypto::Identity;
use crate::node::peer_view::PeerView;
use crate::rendezvous::RendezvousClient;
use crate::rpc::protocol::Notification;
use crate::rpc::RpcClient;
use crate::traits::{RpcTransport, TimeProvider};
use crate::util;

/// Per-recipient result of one broadcast.
#[derive(Debug, Clone, Default)]
pub struct BroadcastReport {
    pub delivered: Vec<Identity>,
    pub failed: Vec<(Identity, String)>,
}

impl<T: RpcTransport, C: TimeProvider> AuctionCoordinator<T, C> {
    /// Send `notification` to every known peer in the background. Returns
    /// immediately; the caller never waits on any receiver.
    pub(super) fn broadcast(&self, notification: Notification) {
        let client = self.client.clone();
        let rendezvous = self.rendezvous.clone();
        let peers = self.peers.clone();

        let handle = tokio::spawn(deliver(client, rendezvous, peers, notification));

        let mut broadcasts = self.broadcasts.lock();
        broadcasts.retain(|h| !h.is_finished());
        broadcasts.push(handle);
    }

    /// Wait for every broadcast started so far to finish.
    pub async fn wait_for_broadcasts(&self) -> Vec<BroadcastReport> {
        let pending = std::mem::take(&mut *self.broadcasts.lock());
        let mut reports = Vec::with_capacity(pending.len());
        for handle in pending {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Broadcast task failed: {}", e),
            }
        }
        reports
    }
}

async fn deliver<T: RpcTransport>(
    client: RpcClient<T>,
    rendezvous: RendezvousClient<T>,
    peers: PeerView,
    notification: Notification,
) -> BroadcastReport {
    // Late joiners only show up in a fresh listing.
    match rendezvous.peers().await {
        Ok(listing) => {
            let count = peers.replace(listing);
            debug!("Refreshed peer view before broadcast: {} peers", count);
        }
        Err(e) => warn!("Peer refresh failed ({}), using cached view", e),
    }

    let mut report = BroadcastReport::default();
    let recipients = peers.snapshot();
    if recipients.is_empty() {
        debug!("No peers to notify");
        return report;
    }

    let payload = match util::encode(&notification) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to encode notification: {}", e);
            return report;
        }
    };

    let mut sends = JoinSet::new();
    for peer in recipients {
        let client = client.clone();
        let payload = payload.clone();
        sends.spawn(async move { (peer, client.notify(&peer, payload).await) });
    }

    while let Some(joined) = sends.join_next().await {
        match joined {
            Ok((peer, Ok(()))) => report.delivered.push(peer),
            Ok((peer, Err(e))) => {
                warn!("Failed to notify {}: {}", peer.short(), e);
                report.failed.push((peer, e.to_string()));
            }
            Err(e) => warn!("Notify task failed: {}", e),
        }
    }

    info!(
        "Broadcast '{}' reached {} peers ({} failed)",
        notification.item,
        report.delivered.len(),
        report.failed.len()
    );
    report
}
