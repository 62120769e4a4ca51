//! Expiration date sealing using AES-GCM.
//!
//! Provides authenticated encryption for the date segment of a token. The
//! wire form is base64 of `nonce ‖ ciphertext ‖ tag`, a single combined
//! field.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{KeySize, SymmetricKey};
use aes_gcm::{
    aead::{consts::U12, Aead, AeadCore, KeyInit, Nonce, OsRng},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};

/// Size of nonce in bytes (96 bits for AES-GCM).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Payload sealed in place of a date when a license never expires.
pub const NO_EXPIRATION: &str = "NoExpiration";

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Encrypted data with the nonce needed for decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Returns the total size of the combined form.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Encodes the combined form as standard base64.
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }

    /// Decodes the combined form from standard base64.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::MalformedCipherText(format!("invalid base64: {e}")))?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::MalformedCipherText(format!(
                "data too short: {} bytes",
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }
}

fn seal<C>(key: &[u8], plaintext: &[u8]) -> CryptoResult<EncryptedData>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let nonce = C::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    nonce_bytes.copy_from_slice(&nonce);

    Ok(EncryptedData {
        nonce: nonce_bytes,
        ciphertext,
    })
}

fn open<C>(key: &[u8], encrypted: &EncryptedData) -> CryptoResult<Vec<u8>>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    // A key of the wrong length can never authenticate anything sealed under this size.
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::AuthenticationFailed)?;
    let nonce = Nonce::<C>::from_slice(&encrypted.nonce);

    cipher
        .decrypt(nonce, encrypted.ciphertext.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Encrypts plaintext with a fresh random nonce.
///
/// The AES-GCM variant is chosen by the key's size.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    match key.size() {
        KeySize::Bits128 => seal::<Aes128Gcm>(key.as_bytes(), plaintext),
        KeySize::Bits192 => seal::<Aes192Gcm>(key.as_bytes(), plaintext),
        KeySize::Bits256 => seal::<Aes256Gcm>(key.as_bytes(), plaintext),
    }
}

/// Decrypts data sealed by [`encrypt`].
///
/// Fails with [`CryptoError::AuthenticationFailed`] on a wrong key or tampered data.
pub fn decrypt(key: &SymmetricKey, encrypted: &EncryptedData) -> CryptoResult<Vec<u8>> {
    match key.size() {
        KeySize::Bits128 => open::<Aes128Gcm>(key.as_bytes(), encrypted),
        KeySize::Bits192 => open::<Aes192Gcm>(key.as_bytes(), encrypted),
        KeySize::Bits256 => open::<Aes256Gcm>(key.as_bytes(), encrypted),
    }
}

/// Renders an expiration date the way it is sealed: UTC, second precision.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a sealed date payload, normalizing any offset to UTC.
///
/// Accepts the signed extended-year form [`format_date`] writes for years
/// outside `0000..=9999` (e.g. `+10000-01-01T00:00:00Z`).
pub fn parse_date(text: &str) -> CryptoResult<DateTime<Utc>> {
    text.parse::<DateTime<Utc>>()
        .map_err(|e| CryptoError::UnparseableDate(format!("{text:?}: {e}")))
}

/// Seals an optional expiration date and returns the base64 combined form.
///
/// An absent date seals the [`NO_EXPIRATION`] sentinel.
pub fn encrypt_date(date: Option<&DateTime<Utc>>, key: &SymmetricKey) -> CryptoResult<String> {
    let payload = match date {
        Some(date) => format_date(date),
        None => NO_EXPIRATION.to_string(),
    };

    Ok(encrypt(key, payload.as_bytes())?.to_base64())
}

/// Opens a sealed expiration date.
///
/// Returns `None` when the payload is the [`NO_EXPIRATION`] sentinel.
pub fn decrypt_date(encoded: &str, key: &SymmetricKey) -> CryptoResult<Option<DateTime<Utc>>> {
    let encrypted = EncryptedData::from_base64(encoded)?;
    let payload = decrypt(key, &encrypted)?;
    let text = String::from_utf8(payload)
        .map_err(|e| CryptoError::UnparseableDate(format!("invalid UTF-8: {e}")))?;

    if text == NO_EXPIRATION {
        return Ok(None);
    }

    parse_date(&text).map(Some)
}
