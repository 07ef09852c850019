//! Wall-clock seam.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of Unix seconds.
///
/// Bids and notifications are stamped through this, and the TCP server uses
/// it to reject requests whose signed timestamp drifted too far.
pub trait TimeProvider: Send + Sync + Clone + 'static {
    fn now_unix(&self) -> u64;
}

/// The host clock. A clock set before 1970 reads as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
    pub const fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}
