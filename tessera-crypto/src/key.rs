//! Symmetric key derivation from key text.
//!
//! The date segment of a token is sealed with a key derived from the
//! issuer's public key text, so issuer and validator arrive at the same key
//! without exchanging anything beyond the public key itself.
//!
//! Derivation is intentionally simple and must stay bit-for-bit stable:
//! the source text is base64-encoded and the leading bytes of that base64
//! text become the key.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use zeroize::Zeroize;

/// Matches BEGIN/END armor lines of PEM key blocks, including adjoining newlines.
static KEY_ARMOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\n)?-* ?(BEGIN|END) ((PRIVATE RSA|PUBLIC RSA)|(RSA PRIVATE|RSA PUBLIC)|(PRIVATE|PUBLIC)) KEY ?-*(\n)?",
    )
    .expect("key armor pattern is valid")
});

/// Supported symmetric key sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum KeySize {
    /// 128-bit key (AES-128-GCM).
    #[default]
    Bits128,
    /// 192-bit key (AES-192-GCM).
    Bits192,
    /// 256-bit key (AES-256-GCM).
    Bits256,
}

impl KeySize {
    /// Returns the key size in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits128 => 128,
            Self::Bits192 => 192,
            Self::Bits256 => 256,
        }
    }

    /// Returns the key size in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Maps a bit count to a supported key size.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            128 => Some(Self::Bits128),
            192 => Some(Self::Bits192),
            256 => Some(Self::Bits256),
            _ => None,
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Error = String;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or_else(|| format!("unsupported key size: {bits} bits"))
    }
}

impl From<KeySize> for u32 {
    fn from(size: KeySize) -> Self {
        size.bits()
    }
}

/// A derived symmetric key with automatic zeroization on drop.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
    size: KeySize,
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl SymmetricKey {
    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key size.
    pub fn size(&self) -> KeySize {
        self.size
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("size", &self.size)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Removes PEM BEGIN/END armor lines, leaving only the key body.
pub fn strip_key_armor(text: &str) -> String {
    KEY_ARMOR.replace_all(text, "").into_owned()
}

/// Derives a symmetric key of `size` from `source`.
///
/// `source` is encoded as UTF-8, re-encoded as standard base64 text, and the
/// first `size.bytes()` bytes of that text are the key.
///
/// # Errors
///
/// Returns [`CryptoError::KeyTooSmall`] when the base64 text is shorter than
/// the requested key.
pub fn derive_key(source: &str, size: KeySize) -> CryptoResult<SymmetricKey> {
    let encoded = BASE64.encode(source.as_bytes());
    let required = size.bytes();
    let available = encoded.len();

    if available < required {
        return Err(CryptoError::KeyTooSmall {
            required,
            available,
        });
    }

    Ok(SymmetricKey {
        bytes: encoded.as_bytes()[..required].to_vec(),
        size,
    })
}

/// Strips the armor from a PEM public key and derives a key from its body.
pub fn derive_key_from_public_key(public_key_pem: &str, size: KeySize) -> CryptoResult<SymmetricKey> {
    derive_key(&strip_key_armor(public_key_pem), size)
}
