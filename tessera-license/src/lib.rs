//! Issuing and offline validation of tessera license tokens.
//!
//! This module handles:
//! - Issuing tokens that bind a plaintext (e.g. a licensee name) to an
//!   optional expiration date
//! - Offline validation against the issuer's public key
//! - Caching the last validated license for re-validation on later launches
//!
//! # Token Format
//!
//! Tokens are formatted as: `base64(sealed date)-base64(signature)`
//!
//! - The date segment is AES-GCM sealed under a key derived from the public
//!   key text; a token without expiration seals the `NoExpiration` sentinel
//! - The signature segment is an Ed25519 signature over the SHA-256 digest
//!   of the plaintext
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tessera_license::{issue, validate, MemoryCache, NamespaceId, ValidationContext};
//!
//! # fn run(private_pem: &str, public_pem: &str) -> tessera_license::LicenseResult<()> {
//! let token = issue(private_pem, public_pem, "Jane Doe", None)?;
//!
//! let ctx = ValidationContext::new(
//!     Arc::new(MemoryCache::new()),
//!     NamespaceId::for_application("com.example.app"),
//! );
//! assert!(validate(&token, "Jane Doe", public_pem, &ctx)?);
//! # Ok(())
//! # }
//! ```

mod cache;
mod codec;
mod config;
mod error;
mod generator;
mod validator;

pub use cache::{CachedLicense, FileCache, LicenseCache, MemoryCache, NamespaceId, NAMESPACE_SUFFIX};
pub use codec::{compose, decompose, LicenseToken, SEGMENT_DELIMITER};
pub use config::{CacheBackend, CacheConfig, CacheWritePolicy, LicenseConfig};
pub use error::{LicenseError, LicenseResult};
pub use generator::{issue, issue_with_key_size};
pub use validator::{
    cached_license, cached_license_status, cached_license_status_at, evaluate,
    has_cached_valid_license, record_validation, remove_cached_license, validate, validate_at,
    CachedLicenseStatus, ValidationContext, Verdict,
};

pub use tessera_crypto::{CryptoError, KeySize};

#[cfg(feature = "keychain")]
pub use cache::KeychainCache;
