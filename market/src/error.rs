//! Domain-specific error types for the auction node library.

use serde::{Deserialize, Serialize};

/// Domain-specific error types for the auction node library.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("An auction is already open for this seller")]
    AlreadyOpen,

    #[error("Auction is not open")]
    AuctionNotOpen,

    #[error("Seller cannot bid on their own auction")]
    SelfBiddingNotAllowed,

    #[error("Bid amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("Call timed out after {0} ms")]
    Timeout(u64),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias.
pub type MarketResult<T> = Result<T, MarketError>;

impl MarketError {
    /// Transient transport failures. Callers may retry these; every other
    /// variant is a protocol answer and retrying will not change it.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::PeerUnreachable(_) | Self::Timeout(_))
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentity(_) => ErrorKind::InvalidIdentity,
            Self::InvalidItem(_) => ErrorKind::InvalidItem,
            Self::AlreadyOpen => ErrorKind::AlreadyOpen,
            Self::AuctionNotOpen => ErrorKind::AuctionNotOpen,
            Self::SelfBiddingNotAllowed => ErrorKind::SelfBiddingNotAllowed,
            Self::NonPositiveAmount => ErrorKind::NonPositiveAmount,
            Self::PeerUnreachable(_) => ErrorKind::PeerUnreachable,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Serialization(_)
            | Self::Crypto(_)
            | Self::Storage(_)
            | Self::Config(_)
            | Self::Other(_) => ErrorKind::Internal,
        }
    }
}

/// Error classification carried across the wire so the caller can branch
/// on the same variant the remote handler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidIdentity,
    InvalidItem,
    AlreadyOpen,
    AuctionNotOpen,
    SelfBiddingNotAllowed,
    NonPositiveAmount,
    PeerUnreachable,
    Timeout,
    Unauthorized,
    Protocol,
    Internal,
}

/// Failure reply of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&MarketError> for RemoteError {
    fn from(err: &MarketError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<RemoteError> for MarketError {
    fn from(remote: RemoteError) -> Self {
        match remote.kind {
            ErrorKind::InvalidIdentity => Self::InvalidIdentity(remote.message),
            ErrorKind::InvalidItem => Self::InvalidItem(remote.message),
            ErrorKind::AlreadyOpen => Self::AlreadyOpen,
            ErrorKind::AuctionNotOpen => Self::AuctionNotOpen,
            ErrorKind::SelfBiddingNotAllowed => Self::SelfBiddingNotAllowed,
            ErrorKind::NonPositiveAmount => Self::NonPositiveAmount,
            // The remote side failed to reach someone else; from our side the
            // call itself succeeded, so this is not retryable here.
            ErrorKind::PeerUnreachable | ErrorKind::Timeout | ErrorKind::Protocol => {
                Self::Protocol(format!("remote failure: {}", remote.message))
            }
            ErrorKind::Unauthorized => Self::Unauthorized(remote.message),
            ErrorKind::Internal => Self::Other(anyhow::anyhow!(remote.message)),
        }
    }
}
