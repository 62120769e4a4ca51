//! Error types for the token cryptography layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while deriving keys, sealing dates or signing.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key source text is too short for the requested key size.
    #[error("key too small: need {required} bytes, source provides {available}")]
    KeyTooSmall { required: usize, available: usize },

    /// Encryption failed (only possible with unusable key material).
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Ciphertext is not valid base64 or is too short to hold nonce and tag.
    #[error("malformed ciphertext: {0}")]
    MalformedCipherText(String),

    /// The AEAD tag did not verify (wrong key or tampered data).
    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailed,

    /// Decrypted payload is neither the no-expiration sentinel nor a date.
    #[error("unparseable expiration date: {0}")]
    UnparseableDate(String),

    /// The private signing key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The public verification key could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature is not valid base64 or has the wrong length.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The signing primitive reported a failure.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}
