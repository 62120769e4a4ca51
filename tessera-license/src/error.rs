//! Error types for the licensing module.

use tessera_crypto::CryptoError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Key derivation, date sealing or signature failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Token does not split into exactly two non-empty segments.
    #[error("malformed license token: {0}")]
    MalformedToken(String),

    /// The license cache could not be read or written.
    #[error("license cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
