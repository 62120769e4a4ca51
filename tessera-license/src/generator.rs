//! Token issuing.
//!
//! Seals the expiration date under a key derived from the public key text,
//! signs the plaintext with the private key and joins both segments.

use crate::codec;
use crate::error::LicenseResult;
use chrono::{DateTime, Utc};
use tessera_crypto::{derive_key_from_public_key, encrypt_date, sign, KeySize};
use tracing::debug;

/// Issues a token binding `plaintext` to `expiration` with the default key size.
///
/// `None` issues a token that never expires. Any failure aborts issuing and
/// surfaces the originating error.
pub fn issue(
    private_key_pem: &str,
    public_key_pem: &str,
    plaintext: &str,
    expiration: Option<DateTime<Utc>>,
) -> LicenseResult<String> {
    issue_with_key_size(
        private_key_pem,
        public_key_pem,
        plaintext,
        expiration,
        KeySize::default(),
    )
}

/// Issues a token whose date segment is sealed with a key of `key_size`.
///
/// Validators must use the same key size.
pub fn issue_with_key_size(
    private_key_pem: &str,
    public_key_pem: &str,
    plaintext: &str,
    expiration: Option<DateTime<Utc>>,
    key_size: KeySize,
) -> LicenseResult<String> {
    let key = derive_key_from_public_key(public_key_pem, key_size)?;
    let date_segment = encrypt_date(expiration.as_ref(), &key)?;
    let signature_segment = sign(plaintext, private_key_pem)?;

    debug!(
        expires = ?expiration,
        key_bits = key_size.bits(),
        "Issued license token"
    );

    Ok(codec::compose(&date_segment, &signature_segment))
}
