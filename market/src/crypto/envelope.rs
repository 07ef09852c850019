use ed25519_dalek::{Signature, Signer, Verifier};
use serde::{Deserialize, Serialize};

use super::identity::{Identity, NodeKeypair};
use crate::error::{MarketError, MarketResult};
use crate::util;

/// Cryptographic envelope wrapping every outgoing request.
///
/// The `payload` is the bincode-serialized request. The sender signs the
/// payload with their Ed25519 key; the receiver verifies the signature
/// before deserializing and treats the signer as the caller identity.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignedEnvelope {
    pub payload: Vec<u8>,
    pub signer: Identity,
    /// Ed25519 signature over `payload` (64 bytes).
    pub signature: Vec<u8>,
}

impl SignedEnvelope {
    pub fn sign(payload: Vec<u8>, keypair: &NodeKeypair) -> Self {
        let signature = keypair.signing_key().sign(&payload);
        Self {
            payload,
            signer: keypair.identity(),
            signature: signature.to_bytes().to_vec(),
        }
    }

    /// Verify the signature and return the payload + signer identity.
    pub fn verify_and_unwrap(data: &[u8]) -> MarketResult<(Vec<u8>, Identity)> {
        let envelope: Self = util::decode(data)?;

        let verifying_key = envelope.signer.verifying_key()?;
        let sig_bytes: [u8; 64] = envelope.signature.as_slice().try_into().map_err(|_| {
            MarketError::Crypto(format!(
                "Invalid signature length: expected 64, got {}",
                envelope.signature.len()
            ))
        })?;
        let signature = Signature::from_bytes(&sig_bytes);
        verifying_key
            .verify(&envelope.payload, &signature)
            .map_err(|e| MarketError::Crypto(format!("Signature verification failed: {e}")))?;

        Ok((envelope.payload, envelope.signer))
    }

    pub fn to_bytes(&self) -> MarketResult<Vec<u8>> {
        util::encode(self)
    }
}
