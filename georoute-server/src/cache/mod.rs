//! Expiring cache for geocoding and routing results.
//!
//! Entries are wrapped with the instant they were stored. A read is only
//! a hit while the entry is younger than the cache's durability; older
//! entries stay in the backing store but are reported as misses. There
//! is no active eviction.
//!
//! Key derivation belongs to the callers, see [`location_key`] and
//! [`route_key`]. Route keys are built from the locations' rendered
//! strings, so the same coordinates rendered differently (e.g. after a
//! name was set) do not share an entry.

mod error;
mod store;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Location, Route};

pub use error::CacheError;
pub use store::{CacheStore, FileStore, MemoryStore};

/// Separator between the two endpoints of a route key.
pub const ROUTE_KEY_SEPARATOR: &str = "->";

const DAY_SECS: u64 = 24 * 60 * 60;

/// Cache key for an address lookup: the lower-cased query.
pub fn location_key(address: &str) -> String {
    address.to_lowercase()
}

/// Cache key for a route: both endpoints' canonical strings.
pub fn route_key(from: &Location, to: &Location) -> String {
    format!("{from}{ROUTE_KEY_SEPARATOR}{to}")
}

/// A stored payload and the instant it was written.
#[derive(Debug, Serialize, Deserialize)]
struct CacheElement<T> {
    stored_at: DateTime<Utc>,
    payload: T,
}

/// Key → payload cache with a fixed durability window.
///
/// Payload-agnostic: anything serde can handle can be stored, though the
/// resolvers only ever store [`Location`]s and [`Route`]s.
pub struct GeoCache {
    store: Box<dyn CacheStore>,
    durability: Duration,
}

impl GeoCache {
    pub const ONE_DAY: Duration = Duration::from_secs(DAY_SECS);
    pub const TWO_DAYS: Duration = Duration::from_secs(2 * DAY_SECS);
    pub const ONE_WEEK: Duration = Duration::from_secs(7 * DAY_SECS);
    pub const TWO_WEEKS: Duration = Duration::from_secs(14 * DAY_SECS);
    pub const ONE_MONTH: Duration = Duration::from_secs(30 * DAY_SECS);
    pub const THREE_MONTHS: Duration = Duration::from_secs(90 * DAY_SECS);
    pub const SIX_MONTHS: Duration = Duration::from_secs(180 * DAY_SECS);
    pub const ONE_YEAR: Duration = Duration::from_secs(365 * DAY_SECS);

    /// Create a cache over an arbitrary store.
    pub fn new(store: impl CacheStore + 'static, durability: Duration) -> Self {
        Self {
            store: Box::new(store),
            durability,
        }
    }

    /// Create a cache persisted to a JSON file at `path`.
    pub fn open(path: impl Into<PathBuf>, durability: Duration) -> Result<Self, CacheError> {
        Ok(Self::new(FileStore::open(path)?, durability))
    }

    /// Create a cache that lives only as long as the process.
    pub fn in_memory(durability: Duration) -> Self {
        Self::new(MemoryStore::new(), durability)
    }

    /// How long an entry stays valid.
    pub fn durability(&self) -> Duration {
        self.durability
    }

    /// Store `payload` under `key`, stamped with the current time.
    pub fn store<T: Serialize>(&self, key: &str, payload: &T) -> Result<(), CacheError> {
        self.store_at(key, payload, Utc::now())
    }

    /// Store `payload` as if it had been written at `stored_at`.
    pub(crate) fn store_at<T: Serialize>(
        &self,
        key: &str,
        payload: &T,
        stored_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let element = CacheElement { stored_at, payload };
        let bytes = serde_json::to_vec(&element).map_err(|e| CacheError::Encode {
            message: e.to_string(),
        })?;
        self.store.put(key, bytes)
    }

    /// Read the payload under `key`.
    ///
    /// Returns `Ok(None)` if there is no entry or the entry has outlived
    /// the durability window.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.store.get(key)? else {
            return Ok(None);
        };

        let element: CacheElement<T> =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Decode {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        if self.is_fresh(element.stored_at, Utc::now()) {
            Ok(Some(element.payload))
        } else {
            Ok(None)
        }
    }

    /// Store a geocoding result for `address`.
    pub fn store_location(&self, address: &str, location: &Location) -> Result<(), CacheError> {
        self.store(&location_key(address), location)
    }

    /// Read a geocoding result for `address`.
    pub fn read_location(&self, address: &str) -> Result<Option<Location>, CacheError> {
        self.read(&location_key(address))
    }

    /// Store a route between `from` and `to`.
    pub fn store_route(
        &self,
        from: &Location,
        to: &Location,
        route: &Route,
    ) -> Result<(), CacheError> {
        self.store(&route_key(from, to), route)
    }

    /// Read a route between `from` and `to`.
    pub fn read_route(&self, from: &Location, to: &Location) -> Result<Option<Route>, CacheError> {
        self.read(&route_key(from, to))
    }

    fn is_fresh(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let max_age = TimeDelta::from_std(self.durability).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(stored_at) < max_age
    }
}
