use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

/// Byte length of an [`Identity`] (an Ed25519 verifying key).
pub const IDENTITY_LEN: usize = 32;

/// Public-key-derived node handle, compared by exact byte equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse raw identity bytes as received over the wire.
    pub fn from_bytes(bytes: &[u8]) -> MarketResult<Self> {
        if bytes.is_empty() {
            return Err(MarketError::InvalidIdentity("empty identity".into()));
        }
        let array: [u8; IDENTITY_LEN] = bytes.try_into().map_err(|_| {
            MarketError::InvalidIdentity(format!(
                "expected {IDENTITY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn from_hex(text: &str) -> MarketResult<Self> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| MarketError::InvalidIdentity(format!("bad hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// First 8 hex characters, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn verifying_key(&self) -> MarketResult<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| MarketError::Crypto(format!("identity is not a valid public key: {e}")))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}…)", self.short())
    }
}

impl FromStr for Identity {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Signing half of a node identity.
#[derive(Clone)]
pub struct NodeKeypair {
    signing_key: SigningKey,
}

impl NodeKeypair {
    /// Deterministically derive the keypair from a persisted seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity(self.signing_key.verifying_key().to_bytes())
    }

    pub const fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for NodeKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeKeypair")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}
