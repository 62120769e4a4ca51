//! Cryptographic building blocks for tessera license tokens.
//!
//! This crate provides:
//! - Symmetric key derivation from (armor-stripped) public key text
//! - AES-GCM sealing of the optional expiration date
//! - Ed25519 signatures over the SHA-256 digest of the license plaintext
//!
//! Every function here is pure over its inputs apart from nonce generation,
//! which draws from the OS random source.

pub mod cipher;
mod error;
pub mod key;
pub mod signing;

pub use cipher::{
    decrypt, decrypt_date, encrypt, encrypt_date, EncryptedData, NONCE_SIZE, NO_EXPIRATION,
    TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, derive_key_from_public_key, strip_key_armor, KeySize, SymmetricKey};
pub use signing::{message_digest, sign, verify, LicenseSigningKey, LicenseVerifyingKey};
