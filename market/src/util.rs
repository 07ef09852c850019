//! Utility functions shared across the crate.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::MAX_FRAME_SIZE;
use crate::error::{MarketError, MarketResult};

fn wire_options() -> impl Options {
    bincode::options().with_limit(MAX_FRAME_SIZE as u64)
}

/// Serialize a wire message with bincode, refusing anything over the frame limit.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> MarketResult<Vec<u8>> {
    wire_options()
        .serialize(value)
        .map_err(|e| MarketError::Serialization(format!("bincode serialization failed: {e}")))
}

/// Deserialize bincode with a size limit to prevent OOM from crafted payloads.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> MarketResult<T> {
    if data.len() > MAX_FRAME_SIZE {
        return Err(MarketError::Serialization(format!(
            "payload too large: {} bytes (max {})",
            data.len(),
            MAX_FRAME_SIZE
        )));
    }
    wire_options()
        .deserialize(data)
        .map_err(|e| MarketError::Serialization(format!("bincode deserialization failed: {e}")))
}
