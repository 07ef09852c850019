//! Randomness seam, used only to generate missing seeds.

use rand::rngs::OsRng;
use rand::RngCore;

pub trait RandomSource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]);

    /// Fresh 32-byte seed.
    fn random_bytes_32(&self) -> [u8; 32] {
        let mut seed = [0u8; 32];
        self.fill_bytes(&mut seed);
        seed
    }
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl OsRandom {
    pub const fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}
