//! Bounded inbox of auction notifications received from sellers.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::crypto::Identity;
use crate::rpc::protocol::Notification;

/// Notifications are hints: delivery is best-effort, so anything read here
/// should be confirmed with `getAuctionStatus` when it matters.
#[derive(Debug, Clone)]
pub struct NotificationInbox {
    capacity: usize,
    entries: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationInbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Store a notification, evicting the oldest once full.
    pub fn push(&self, notification: Notification) {
        info!("{}", notification);
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
    }

    pub fn all(&self) -> Vec<Notification> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn from_seller(&self, seller: &Identity) -> Vec<Notification> {
        self.entries
            .lock()
            .iter()
            .filter(|n| &n.seller == seller)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
