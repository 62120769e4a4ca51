//! Ed25519 signing and verification of license plaintexts.
//!
//! Keys are PKCS#8 PEM text. The signature covers the SHA-256 digest of the
//! UTF-8 plaintext and travels as standard base64.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey,
};
use sha2::{Digest, Sha256};

/// Size of a raw Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Private key used by issuers to sign license plaintexts.
pub struct LicenseSigningKey(SigningKey);

/// Public key used by validators to check license signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseVerifyingKey(VerifyingKey);

impl LicenseSigningKey {
    /// Parses a PKCS#8 PEM private key.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        SigningKey::from_pkcs8_pem(pem.trim())
            .map(Self)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }

    /// Signs the digest of `plaintext` and returns the base64 signature.
    pub fn sign(&self, plaintext: &str) -> CryptoResult<String> {
        let digest = message_digest(plaintext);
        let signature = self
            .0
            .try_sign(&digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }

    /// Returns the matching verifying key.
    pub fn verifying_key(&self) -> LicenseVerifyingKey {
        LicenseVerifyingKey(self.0.verifying_key())
    }
}

impl std::fmt::Debug for LicenseSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseSigningKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl LicenseVerifyingKey {
    /// Parses a PKCS#8 (SubjectPublicKeyInfo) PEM public key.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        VerifyingKey::from_public_key_pem(pem.trim())
            .map(Self)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Checks a base64 signature over the digest of `plaintext`.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not match;
    /// a signature that cannot be decoded is an error.
    pub fn verify(&self, plaintext: &str, signature_b64: &str) -> CryptoResult<bool> {
        let bytes = STANDARD
            .decode(signature_b64)
            .map_err(|e| CryptoError::MalformedSignature(format!("invalid base64: {e}")))?;

        if bytes.len() != SIGNATURE_SIZE {
            return Err(CryptoError::MalformedSignature(format!(
                "expected {SIGNATURE_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let signature = Signature::from_slice(&bytes)
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;

        let digest = message_digest(plaintext);
        Ok(self.0.verify(&digest, &signature).is_ok())
    }
}

/// SHA-256 digest of the UTF-8 plaintext; this is what gets signed.
pub fn message_digest(plaintext: &str) -> [u8; 32] {
    Sha256::digest(plaintext.as_bytes()).into()
}

/// Signs `plaintext` with a PEM private key.
pub fn sign(plaintext: &str, private_key_pem: &str) -> CryptoResult<String> {
    LicenseSigningKey::from_pem(private_key_pem)?.sign(plaintext)
}

/// Verifies a base64 signature of `plaintext` with a PEM public key.
pub fn verify(plaintext: &str, signature_b64: &str, public_key_pem: &str) -> CryptoResult<bool> {
    LicenseVerifyingKey::from_pem(public_key_pem)?.verify(plaintext, signature_b64)
}
