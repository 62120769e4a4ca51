//! Persistent cache of the last validated license.
//!
//! Hosts keep at most one `(token, plaintext)` record per namespace id so a
//! license entered once can be re-validated offline on later launches. The
//! validator depends on `Arc<dyn LicenseCache>` and never on a concrete
//! store; tests use [`MemoryCache`].

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Suffix appended to the host application id to form its namespace id.
pub const NAMESPACE_SUFFIX: &str = ".license";

/// Identifies the single cached license record of one installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(String);

impl NamespaceId {
    /// Wraps a raw namespace id. Returns `None` for a blank id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Derives the namespace id of a host application, e.g.
    /// `com.example.app` → `com.example.app.license`.
    ///
    /// Returns `None` when the host has no usable identifier; callers then
    /// treat the cache as unavailable.
    #[must_use]
    pub fn for_application(app_id: &str) -> Option<Self> {
        let app_id = app_id.trim();
        if app_id.is_empty() {
            return None;
        }
        Some(Self(format!("{app_id}{NAMESPACE_SUFFIX}")))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached `(token, plaintext)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLicense {
    /// The license token as entered by the user.
    pub token: String,
    /// The plaintext the token was validated against.
    pub plaintext: String,
}

impl CachedLicense {
    /// Creates a cache record.
    #[must_use]
    pub fn new(token: impl Into<String>, plaintext: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            plaintext: plaintext.into(),
        }
    }
}

/// Storage for one cached license per namespace id.
///
/// Implementations must overwrite on `put` and treat `remove` of an absent
/// record as success. No locking is implied across calls; hosts validating
/// concurrently must serialize access themselves.
pub trait LicenseCache: Send + Sync {
    /// Stores `license`, replacing any existing record for `namespace`.
    fn put(&self, namespace: &NamespaceId, license: CachedLicense) -> LicenseResult<()>;

    /// Loads the record for `namespace`, if any.
    fn get(&self, namespace: &NamespaceId) -> LicenseResult<Option<CachedLicense>>;

    /// Deletes the record for `namespace`. Absent records are not an error.
    fn remove(&self, namespace: &NamespaceId) -> LicenseResult<()>;
}

/// In-process cache. Records live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryCache {
    records: Mutex<HashMap<NamespaceId, CachedLicense>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> LicenseResult<std::sync::MutexGuard<'_, HashMap<NamespaceId, CachedLicense>>> {
        self.records
            .lock()
            .map_err(|_| LicenseError::CacheUnavailable("memory cache lock poisoned".to_string()))
    }
}

impl LicenseCache for MemoryCache {
    fn put(&self, namespace: &NamespaceId, license: CachedLicense) -> LicenseResult<()> {
        self.lock()?.insert(namespace.clone(), license);
        Ok(())
    }

    fn get(&self, namespace: &NamespaceId) -> LicenseResult<Option<CachedLicense>> {
        Ok(self.lock()?.get(namespace).cloned())
    }

    fn remove(&self, namespace: &NamespaceId) -> LicenseResult<()> {
        self.lock()?.remove(namespace);
        Ok(())
    }
}

/// File-backed cache: one JSON record per namespace id in a directory.
///
/// Records are named after the SHA-256 of the namespace id, so distinct ids
/// never share a file. Writes go to a temporary file that is renamed into
/// place, so a reader never sees a half-written record. On Unix the record
/// is created readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Creates a cache rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the platform default directory (`<local data>/tessera/licenses`).
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("tessera").join("licenses"))
    }

    /// Creates a cache in the platform default directory.
    pub fn open_default() -> LicenseResult<Self> {
        Self::default_dir().map(Self::new).ok_or_else(|| {
            LicenseError::CacheUnavailable("no local data directory on this platform".to_string())
        })
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the record file for `namespace`.
    #[must_use]
    pub fn record_path(&self, namespace: &NamespaceId) -> PathBuf {
        let name = hex::encode(Sha256::digest(namespace.as_str().as_bytes()));
        self.dir.join(format!("{name}.json"))
    }
}

fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn io_unavailable(action: &str, path: &Path, e: std::io::Error) -> LicenseError {
    LicenseError::CacheUnavailable(format!("failed to {action} {}: {e}", path.display()))
}

impl LicenseCache for FileCache {
    fn put(&self, namespace: &NamespaceId, license: CachedLicense) -> LicenseResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| io_unavailable("create", &self.dir, e))?;

        let path = self.record_path(namespace);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(&license)?;

        // A leftover from an interrupted write may carry looser permissions.
        match fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_unavailable("clear", &tmp, e)),
        }

        if let Err(e) = write_private(&tmp, &json) {
            let _ = fs::remove_file(&tmp);
            return Err(io_unavailable("write", &tmp, e));
        }

        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_unavailable("replace", &path, e));
        }

        debug!("Cached license for namespace {}", namespace);
        Ok(())
    }

    fn get(&self, namespace: &NamespaceId) -> LicenseResult<Option<CachedLicense>> {
        let path = self.record_path(namespace);
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_unavailable("read", &path, e)),
        };

        serde_json::from_slice(&contents).map(Some).map_err(|e| {
            LicenseError::CacheUnavailable(format!("corrupt record {}: {e}", path.display()))
        })
    }

    fn remove(&self, namespace: &NamespaceId) -> LicenseResult<()> {
        let path = self.record_path(namespace);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed cached license for namespace {}", namespace);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_unavailable("remove", &path, e)),
        }
    }
}

/// OS keychain cache backed by the `keyring` crate.
///
/// Each namespace id is stored as one credential under `service`.
#[cfg(feature = "keychain")]
#[derive(Debug, Clone)]
pub struct KeychainCache {
    service: String,
}

#[cfg(feature = "keychain")]
impl KeychainCache {
    /// Default keychain service name.
    pub const DEFAULT_SERVICE: &'static str = "tessera-license";

    /// Creates a keychain cache under `service`.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, namespace: &NamespaceId) -> LicenseResult<keyring::Entry> {
        keyring::Entry::new(&self.service, namespace.as_str()).map_err(keychain_unavailable)
    }
}

#[cfg(feature = "keychain")]
impl Default for KeychainCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SERVICE)
    }
}

#[cfg(feature = "keychain")]
fn keychain_unavailable(e: keyring::Error) -> LicenseError {
    LicenseError::CacheUnavailable(format!("keychain: {e}"))
}

#[cfg(feature = "keychain")]
impl LicenseCache for KeychainCache {
    fn put(&self, namespace: &NamespaceId, license: CachedLicense) -> LicenseResult<()> {
        let json = serde_json::to_string(&license)?;
        self.entry(namespace)?
            .set_password(&json)
            .map_err(keychain_unavailable)
    }

    fn get(&self, namespace: &NamespaceId) -> LicenseResult<Option<CachedLicense>> {
        match self.entry(namespace)?.get_password() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keychain_unavailable(e)),
        }
    }

    fn remove(&self, namespace: &NamespaceId) -> LicenseResult<()> {
        match self.entry(namespace)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keychain_unavailable(e)),
        }
    }
}
