//! Backing stores for the geo cache.
//!
//! A store is a plain key → bytes map. It knows nothing about payload
//! types or expiry; both live in [`GeoCache`](super::GeoCache).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use moka::sync::Cache as MokaCache;
use serde::{Deserialize, Serialize};

use super::error::CacheError;

/// Default capacity of an in-memory store.
const DEFAULT_MEMORY_CAPACITY: u64 = 10_000;

/// Durable key → bytes storage.
///
/// Implementations only need point lookups and overwrites. They are not
/// required to make concurrent read-modify-write sequences atomic.
pub trait CacheStore: Send + Sync {
    /// Fetch the bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;
}

/// On-disk layout of a [`FileStore`].
#[derive(Debug, Default, Deserialize)]
struct StoreFile {
    /// Base64-encoded values keyed by cache key.
    entries: BTreeMap<String, String>,
}

/// Write side of [`StoreFile`].
#[derive(Serialize)]
struct StoreFileRef<'a> {
    entries: &'a BTreeMap<String, String>,
}

/// A JSON file holding every entry, rewritten on each `put`.
///
/// Writes go to a sibling temp file that is renamed over the original,
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories if needed.
    ///
    /// A missing file is treated as an empty store; the file is created on
    /// the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let file: StoreFile =
                    serde_json::from_str(&contents).map_err(|e| CacheError::Decode {
                        key: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        let json =
            serde_json::to_vec(&StoreFileRef { entries }).map_err(|e| CacheError::Encode {
                message: e.to_string(),
            })?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .map(|encoded| {
                BASE64.decode(encoded).map_err(|e| CacheError::Decode {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = entries.clone();
        updated.insert(key.to_string(), BASE64.encode(value));
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// Process-local store. Contents are lost when the process exits.
///
/// Bounded by entry count; the least useful entries are evicted once the
/// capacity is reached.
#[derive(Clone)]
pub struct MemoryStore {
    entries: MokaCache<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// Create a store holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            entries: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Approximate number of entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
