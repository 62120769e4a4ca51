//! Shared test helpers for license tests.

#![allow(dead_code)]

use ed25519_dalek::{
    pkcs8::{spki::der::pem::LineEnding, EncodePrivateKey, EncodePublicKey},
    SigningKey,
};
use std::sync::Arc;
use tessera_license::{MemoryCache, NamespaceId, ValidationContext};

pub const APP_ID: &str = "com.example.tessera-tests";

/// PEM-encoded Ed25519 key pair.
pub struct PemKeyPair {
    pub private: String,
    pub public: String,
}

fn keypair_from_seed(seed: [u8; 32]) -> PemKeyPair {
    let signing_key = SigningKey::from_bytes(&seed);
    PemKeyPair {
        private: signing_key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
        public: signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap(),
    }
}

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> PemKeyPair {
    keypair_from_seed([
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ])
}

/// A second, unrelated key pair.
pub fn other_keypair() -> PemKeyPair {
    keypair_from_seed([42; 32])
}

/// Context over a fresh in-memory cache, plus a handle to inspect it.
pub fn memory_context() -> (ValidationContext, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let ctx = ValidationContext::new(cache.clone(), NamespaceId::for_application(APP_ID));
    (ctx, cache)
}

/// Replaces the character at `index` with a different base64 character.
pub fn flip_char(text: &str, index: usize) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}
