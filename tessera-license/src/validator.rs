//! Token validation and cache-backed re-validation.
//!
//! [`validate`] is fail-fast: a malformed token, an unopenable date segment
//! or an unparseable key surface as errors, while a wrong signature or an
//! expired date is an ordinary `Ok(false)`. [`has_cached_valid_license`] is
//! the one fail-silent entry point and only ever answers with a boolean;
//! [`cached_license_status`] keeps the distinction for callers that need it.

use crate::cache::{CachedLicense, LicenseCache, NamespaceId};
use crate::codec::LicenseToken;
use crate::config::{CacheWritePolicy, LicenseConfig};
use crate::error::LicenseResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_crypto::{decrypt_date, derive_key_from_public_key, verify, KeySize};
use tracing::{debug, warn};

/// Outcome of checking a well-formed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The signature matches the plaintext under the public key.
    pub signature_valid: bool,
    /// The sealed expiration date lies in the past.
    pub expired: bool,
    /// The sealed expiration date, or `None` for a token that never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Verdict {
    /// Returns true if the token authenticates and has not expired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.signature_valid && !self.expired
    }
}

/// Result of re-validating the cached license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedLicenseStatus {
    /// Nothing is cached (or no namespace is available).
    NoCachedLicense,
    /// A license is cached but is expired or does not authenticate.
    Invalid,
    /// A license is cached and valid.
    Valid,
}

/// Collaborators the validator needs besides the token itself.
#[derive(Clone)]
pub struct ValidationContext {
    cache: Arc<dyn LicenseCache>,
    namespace: Option<NamespaceId>,
    key_size: KeySize,
    write_policy: CacheWritePolicy,
}

impl ValidationContext {
    /// Creates a context with the default key size and write policy.
    ///
    /// With `namespace` set to `None` the cache is treated as unavailable:
    /// reads find nothing and writes are skipped.
    pub fn new(cache: Arc<dyn LicenseCache>, namespace: Option<NamespaceId>) -> Self {
        Self {
            cache,
            namespace,
            key_size: KeySize::default(),
            write_policy: CacheWritePolicy::default(),
        }
    }

    /// Builds a context from configuration, opening the configured cache.
    pub fn from_config(config: &LicenseConfig) -> LicenseResult<Self> {
        Ok(Self::new(config.open_cache()?, config.namespace())
            .with_key_size(config.key_size)
            .with_write_policy(config.write_policy))
    }

    /// Sets the symmetric key size tokens were issued with.
    #[must_use]
    pub fn with_key_size(mut self, key_size: KeySize) -> Self {
        self.key_size = key_size;
        self
    }

    /// Sets when validation results are cached.
    #[must_use]
    pub fn with_write_policy(mut self, write_policy: CacheWritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    /// Returns the cache namespace, if any.
    pub fn namespace(&self) -> Option<&NamespaceId> {
        self.namespace.as_ref()
    }

    /// Returns the configured key size.
    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// Returns the configured write policy.
    pub fn write_policy(&self) -> CacheWritePolicy {
        self.write_policy
    }
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("namespace", &self.namespace)
            .field("key_size", &self.key_size)
            .field("write_policy", &self.write_policy)
            .finish_non_exhaustive()
    }
}

/// Checks a token against `plaintext` and `public_key_pem` at time `now`.
///
/// Touches no cache.
pub fn evaluate(
    token: &str,
    plaintext: &str,
    public_key_pem: &str,
    key_size: KeySize,
    now: DateTime<Utc>,
) -> LicenseResult<Verdict> {
    let token = LicenseToken::parse(token)?;

    let key = derive_key_from_public_key(public_key_pem, key_size)?;
    let expires_at = decrypt_date(token.date_segment(), &key)?;
    let expired = expires_at.is_some_and(|date| date < now);

    let signature_valid = verify(plaintext, token.signature_segment(), public_key_pem)?;

    Ok(Verdict {
        signature_valid,
        expired,
        expires_at,
    })
}

/// Validates a token and caches it.
///
/// Returns `Ok(true)` only for an authentic, unexpired token.
pub fn validate(
    token: &str,
    plaintext: &str,
    public_key_pem: &str,
    ctx: &ValidationContext,
) -> LicenseResult<bool> {
    validate_at(token, plaintext, public_key_pem, ctx, Utc::now())
}

/// [`validate`] with an explicit current time.
pub fn validate_at(
    token: &str,
    plaintext: &str,
    public_key_pem: &str,
    ctx: &ValidationContext,
    now: DateTime<Utc>,
) -> LicenseResult<bool> {
    let verdict = evaluate(token, plaintext, public_key_pem, ctx.key_size, now)?;

    debug!(
        signature_valid = verdict.signature_valid,
        expired = verdict.expired,
        "Validated license token"
    );

    record_validation(ctx, token, plaintext, &verdict);
    Ok(verdict.is_valid())
}

/// Post-validation hook: writes `(token, plaintext)` to the cache as the
/// context's write policy allows.
///
/// Returns whether a record was written. Cache failures are logged and never
/// change the validation outcome.
pub fn record_validation(
    ctx: &ValidationContext,
    token: &str,
    plaintext: &str,
    verdict: &Verdict,
) -> bool {
    let Some(namespace) = &ctx.namespace else {
        return false;
    };

    if ctx.write_policy == CacheWritePolicy::OnlyValid && !verdict.is_valid() {
        return false;
    }

    match ctx
        .cache
        .put(namespace, CachedLicense::new(token, plaintext))
    {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to cache license for {}: {}", namespace, e);
            false
        }
    }
}

/// Loads the cached license, if any.
pub fn cached_license(ctx: &ValidationContext) -> LicenseResult<Option<CachedLicense>> {
    match &ctx.namespace {
        Some(namespace) => ctx.cache.get(namespace),
        None => Ok(None),
    }
}

/// Removes the cached license. Does nothing when none is cached.
pub fn remove_cached_license(ctx: &ValidationContext) -> LicenseResult<()> {
    match &ctx.namespace {
        Some(namespace) => ctx.cache.remove(namespace),
        None => Ok(()),
    }
}

/// Re-validates the cached license against `public_key_pem`.
///
/// Errors (unreadable cache, corrupted or tampered token) are returned
/// rather than folded into [`CachedLicenseStatus::Invalid`].
pub fn cached_license_status(
    public_key_pem: &str,
    ctx: &ValidationContext,
) -> LicenseResult<CachedLicenseStatus> {
    cached_license_status_at(public_key_pem, ctx, Utc::now())
}

/// [`cached_license_status`] with an explicit current time.
pub fn cached_license_status_at(
    public_key_pem: &str,
    ctx: &ValidationContext,
    now: DateTime<Utc>,
) -> LicenseResult<CachedLicenseStatus> {
    let Some(cached) = cached_license(ctx)? else {
        return Ok(CachedLicenseStatus::NoCachedLicense);
    };

    if validate_at(&cached.token, &cached.plaintext, public_key_pem, ctx, now)? {
        Ok(CachedLicenseStatus::Valid)
    } else {
        Ok(CachedLicenseStatus::Invalid)
    }
}

/// Returns true if a valid license is cached.
///
/// Intentionally collapses "nothing cached", "cached but invalid" and
/// "cached but unverifiable" into `false`; use [`cached_license_status`] to
/// tell them apart.
pub fn has_cached_valid_license(public_key_pem: &str, ctx: &ValidationContext) -> bool {
    match cached_license_status(public_key_pem, ctx) {
        Ok(status) => status == CachedLicenseStatus::Valid,
        Err(e) => {
            debug!("Cached license could not be verified: {}", e);
            false
        }
    }
}
