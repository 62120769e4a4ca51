//! License configuration: reads `license.toml` and decides where cached
//! licenses live, which symmetric key size tokens use and when validation
//! results are cached.

use crate::cache::{FileCache, LicenseCache, MemoryCache, NamespaceId};
use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessera_crypto::KeySize;
use tracing::{info, warn};

/// When the validator writes the `(token, plaintext)` pair to the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheWritePolicy {
    /// Cache after every validation, whatever the outcome.
    #[default]
    Always,
    /// Cache only tokens that validated successfully.
    OnlyValid,
}

/// Cache storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process only; nothing survives a restart.
    Memory,
    /// JSON record files in a local directory.
    #[default]
    File,
    /// OS keychain (requires the `keychain` feature).
    Keychain,
}

/// Cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Where records are stored.
    #[serde(default)]
    pub backend: CacheBackend,
    /// Record directory for the file backend; platform default when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Configuration parsed from `license.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// Host application identifier the cache namespace is derived from.
    #[serde(default)]
    pub application_id: Option<String>,
    /// Symmetric key size for the date segment, in bits (128, 192 or 256).
    #[serde(default)]
    pub key_size: KeySize,
    /// When validation results are written to the cache.
    #[serde(default)]
    pub write_policy: CacheWritePolicy,
    /// The `[cache]` table.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl LicenseConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> LicenseResult<Self> {
        toml::from_str(contents).map_err(|e| LicenseError::Config(e.to_string()))
    }

    /// Loads configuration from an explicit path.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No license config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded license config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse license config {:?}: {}. Using defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read license config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Returns the cache namespace, or `None` when no application id is set.
    #[must_use]
    pub fn namespace(&self) -> Option<NamespaceId> {
        self.application_id
            .as_deref()
            .and_then(NamespaceId::for_application)
    }

    /// Opens the configured cache backend.
    pub fn open_cache(&self) -> LicenseResult<Arc<dyn LicenseCache>> {
        match self.cache.backend {
            CacheBackend::Memory => Ok(Arc::new(MemoryCache::new())),
            CacheBackend::File => {
                let cache = match &self.cache.directory {
                    Some(dir) => FileCache::new(dir),
                    None => FileCache::open_default()?,
                };
                Ok(Arc::new(cache))
            }
            #[cfg(feature = "keychain")]
            CacheBackend::Keychain => Ok(Arc::new(crate::cache::KeychainCache::default())),
            #[cfg(not(feature = "keychain"))]
            CacheBackend::Keychain => Err(LicenseError::CacheUnavailable(
                "keychain backend requires the `keychain` feature".to_string(),
            )),
        }
    }
}
