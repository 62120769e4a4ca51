use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tessera_crypto::{
    decrypt, decrypt_date, derive_key, encrypt, encrypt_date, CryptoError, EncryptedData,
    KeySize, SymmetricKey, NONCE_SIZE, NO_EXPIRATION, TAG_SIZE,
};

fn test_key() -> SymmetricKey {
    derive_key("MCowBQYDK2VwAyEAA6EHv/POEL4dcN0Y50vAmWfk1jCbpQ1fHdyGZBJVMbg=", KeySize::Bits128)
        .unwrap()
}

fn other_key() -> SymmetricKey {
    derive_key("an unrelated key body", KeySize::Bits128).unwrap()
}

// ── Bytes ────────────────────────────────────────────────────────

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = test_key();
    let encrypted = encrypt(&key, b"Hello, World!").unwrap();
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, b"Hello, World!");
}

#[test]
fn every_key_size_roundtrips() {
    let source = "a source string long enough for a 256 bit key";
    for size in [KeySize::Bits128, KeySize::Bits192, KeySize::Bits256] {
        let key = derive_key(source, size).unwrap();
        let encrypted = encrypt(&key, b"payload").unwrap();
        assert_eq!(decrypt(&key, &encrypted).unwrap(), b"payload");
    }
}

#[test]
fn wrong_key_fails_authentication() {
    let encrypted = encrypt(&test_key(), b"Secret").unwrap();
    assert!(matches!(
        decrypt(&other_key(), &encrypted),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn tampered_data_fails_authentication() {
    let key = test_key();
    let mut encrypted = encrypt(&key, b"Secret").unwrap();
    encrypted.ciphertext[0] ^= 0xFF;
    assert!(matches!(
        decrypt(&key, &encrypted),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn same_plaintext_produces_different_ciphertext() {
    let key = test_key();
    let e1 = encrypt(&key, b"Same").unwrap();
    let e2 = encrypt(&key, b"Same").unwrap();
    assert_ne!(e1.nonce, e2.nonce);
    assert_ne!(e1.ciphertext, e2.ciphertext);
}

#[test]
fn ciphertext_carries_tag() {
    let encrypted = encrypt(&test_key(), b"test").unwrap();
    assert_eq!(encrypted.ciphertext.len(), 4 + TAG_SIZE);
    assert_eq!(encrypted.len(), NONCE_SIZE + 4 + TAG_SIZE);
}

// ── EncryptedData ────────────────────────────────────────────────

#[test]
fn base64_is_nonce_then_ciphertext() {
    let encrypted = encrypt(&test_key(), b"Data").unwrap();
    let raw = STANDARD.decode(encrypted.to_base64()).unwrap();
    assert_eq!(&raw[..NONCE_SIZE], &encrypted.nonce);
    assert_eq!(&raw[NONCE_SIZE..], encrypted.ciphertext.as_slice());
}

#[test]
fn base64_roundtrip() {
    let encrypted = encrypt(&test_key(), b"Data").unwrap();
    let decoded = EncryptedData::from_base64(&encrypted.to_base64()).unwrap();
    assert_eq!(encrypted, decoded);
}

#[test]
fn base64_too_short_fails() {
    // Less than NONCE_SIZE + TAG_SIZE = 28 bytes
    let short = STANDARD.encode([0u8; 27]);
    assert!(matches!(
        EncryptedData::from_base64(&short),
        Err(CryptoError::MalformedCipherText(_))
    ));
}

#[test]
fn base64_invalid_fails() {
    assert!(matches!(
        EncryptedData::from_base64("!!!not-base64!!!"),
        Err(CryptoError::MalformedCipherText(_))
    ));
}

#[test]
fn url_safe_alphabet_is_rejected() {
    let encrypted = encrypt(&test_key(), &[0xfb; 40]).unwrap();
    let url_safe = encrypted.to_base64().replace('+', "-").replace('/', "_");
    if url_safe != encrypted.to_base64() {
        assert!(EncryptedData::from_base64(&url_safe).is_err());
    }
}

// ── Dates ────────────────────────────────────────────────────────

#[test]
fn absent_date_roundtrips_to_none() {
    let key = test_key();
    let sealed = encrypt_date(None, &key).unwrap();
    assert_eq!(decrypt_date(&sealed, &key).unwrap(), None);
}

#[test]
fn absent_date_seals_sentinel() {
    let key = test_key();
    let sealed = encrypt_date(None, &key).unwrap();
    let payload = decrypt(&key, &EncryptedData::from_base64(&sealed).unwrap()).unwrap();
    assert_eq!(payload, NO_EXPIRATION.as_bytes());
}

#[test]
fn date_roundtrips_at_second_precision() {
    let key = test_key();
    let date = Utc.with_ymd_and_hms(2031, 7, 4, 12, 30, 45).unwrap()
        + Duration::milliseconds(987);
    let sealed = encrypt_date(Some(&date), &key).unwrap();
    let opened = decrypt_date(&sealed, &key).unwrap().unwrap();
    assert_eq!(opened, Utc.with_ymd_and_hms(2031, 7, 4, 12, 30, 45).unwrap());
}

#[test]
fn date_payload_is_iso8601_utc() {
    let key = test_key();
    let date = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let sealed = encrypt_date(Some(&date), &key).unwrap();
    let payload = decrypt(&key, &EncryptedData::from_base64(&sealed).unwrap()).unwrap();
    assert_eq!(payload, b"2030-01-01T00:00:00Z");
}

#[test]
fn extended_year_dates_roundtrip() {
    let key = test_key();
    let far_future = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    let before_common_era = Utc.with_ymd_and_hms(-1, 6, 15, 8, 0, 0).unwrap();

    for date in [far_future, before_common_era] {
        let sealed = encrypt_date(Some(&date), &key).unwrap();
        assert_eq!(decrypt_date(&sealed, &key).unwrap(), Some(date));
    }

    let sealed = encrypt_date(Some(&far_future), &key).unwrap();
    let payload = decrypt(&key, &EncryptedData::from_base64(&sealed).unwrap()).unwrap();
    assert_eq!(payload, b"+10000-01-01T00:00:00Z");
}

#[test]
fn representable_extremes_roundtrip() {
    let key = test_key();
    let latest = DateTime::<Utc>::MAX_UTC;
    let earliest = DateTime::<Utc>::MIN_UTC;

    let sealed = encrypt_date(Some(&latest), &key).unwrap();
    assert_eq!(
        decrypt_date(&sealed, &key).unwrap(),
        DateTime::from_timestamp(latest.timestamp(), 0)
    );

    let sealed = encrypt_date(Some(&earliest), &key).unwrap();
    assert_eq!(decrypt_date(&sealed, &key).unwrap(), Some(earliest));
}

#[test]
fn offset_dates_normalize_to_utc() {
    let key = test_key();
    let payload = "2030-01-01T02:00:00+02:00";
    let sealed = encrypt(&key, payload.as_bytes()).unwrap().to_base64();
    let opened: DateTime<Utc> = decrypt_date(&sealed, &key).unwrap().unwrap();
    assert_eq!(opened, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn gibberish_is_malformed_ciphertext() {
    assert!(matches!(
        decrypt_date("gibberish", &test_key()),
        Err(CryptoError::MalformedCipherText(_))
    ));
}

#[test]
fn date_under_wrong_key_fails_authentication() {
    let sealed = encrypt_date(None, &test_key()).unwrap();
    assert!(matches!(
        decrypt_date(&sealed, &other_key()),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn non_date_payload_is_unparseable() {
    let key = test_key();
    let sealed = encrypt(&key, b"next tuesday").unwrap().to_base64();
    assert!(matches!(
        decrypt_date(&sealed, &key),
        Err(CryptoError::UnparseableDate(_))
    ));
}

#[test]
fn non_utf8_payload_is_unparseable() {
    let key = test_key();
    let sealed = encrypt(&key, &[0xff, 0xfe, 0xfd]).unwrap().to_base64();
    assert!(matches!(
        decrypt_date(&sealed, &key),
        Err(CryptoError::UnparseableDate(_))
    ));
}

#[test]
fn sentinel_match_is_exact() {
    let key = test_key();
    let sealed = encrypt(&key, b"noexpiration").unwrap().to_base64();
    assert!(decrypt_date(&sealed, &key).is_err());
}

#[test]
fn sealed_date_never_contains_delimiter() {
    let key = test_key();
    for _ in 0..32 {
        let sealed = encrypt_date(None, &key).unwrap();
        assert!(!sealed.contains('-'));
    }
}
