//! Versioned, expiring cache for snapshot data.
//!
//! Payloads are wrapped in a [`CacheEntry`] envelope carrying the write
//! timestamp, serialized as JSON into an injectable [`StoragePort`]. A single
//! integer schema marker gates the whole key set: when the compiled-in
//! version is ahead of the stored one, every known key is evicted before any
//! read or write. Unparseable entries are cache misses, never errors.

mod error;
mod store;

pub use error::CacheError;
pub use store::{FileStore, MemoryStore, StoragePort};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Snapshot data is trusted for five minutes after a successful fetch.
pub const SNAPSHOT_TTL_MS: i64 = 5 * 60 * 1000;

/// Bumped whenever a cached payload shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 3;

/// Durable key names. Stable across restarts; renaming one requires a
/// [`SCHEMA_VERSION`] bump.
pub mod keys {
    /// Combined-mode snapshot payload ([`ModeSnapshots`](bosswatch_types::ModeSnapshots)).
    pub const SNAPSHOTS: &str = "spawn_snapshots";
    /// Last-known snapshot as of just before the latest refresh.
    pub const SNAPSHOTS_PREVIOUS: &str = "spawn_snapshots_previous";
    /// Cached change-log feed (raw record array, no envelope).
    pub const CHANGE_LOG: &str = "change_log";
    /// Epoch-millis marker for the change-log cache's own TTL tracking.
    pub const CHANGE_LOG_FETCHED_AT: &str = "change_log_fetched_at";
    /// Integer schema marker; rewritten, not evicted, on upgrade.
    pub const SCHEMA_VERSION: &str = "schema_version";
}

/// Every data key wiped by a schema upgrade.
const EVICT_ON_UPGRADE: [&str; 4] = [
    keys::SNAPSHOTS,
    keys::SNAPSHOTS_PREVIOUS,
    keys::CHANGE_LOG,
    keys::CHANGE_LOG_FETCHED_AT,
];

const PREVIOUS_SUFFIX: &str = "_previous";

/// Sibling key holding the one retained prior generation of `key`.
pub fn previous_key(key: &str) -> String {
    format!("{key}{PREVIOUS_SUFFIX}")
}

/// Stored payload plus its write time in epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, ttl_ms: i64) -> bool {
        self.is_fresh_at(Utc::now().timestamp_millis(), ttl_ms)
    }

    /// Freshness against an explicit clock: `now - timestamp < ttl`, strict.
    pub fn is_fresh_at(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.timestamp < ttl_ms
    }
}

/// Schema-gated cache over a [`StoragePort`]. The fetch orchestrator is the
/// sole writer; consumers read only.
#[derive(Debug)]
pub struct VersionedCache<S> {
    store: S,
}

impl<S: StoragePort> VersionedCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Wrap `data` in an envelope stamped with the current time and persist
    /// it, replacing any existing value wholesale.
    pub fn write<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry {
            data,
            timestamp: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => self.store.set(key, &raw),
            Err(err) => warn!(key, %err, "failed to serialize cache entry"),
        }
    }

    /// Absent and unparseable entries are both misses.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(key, %err, "unparseable cache entry, treating as miss");
                None
            }
        }
    }

    /// Copy the current value at `key` to its `_previous` sibling. No-op when
    /// absent. At most one prior generation is retained.
    pub fn promote_to_previous(&self, key: &str) {
        if let Some(raw) = self.store.get(key) {
            self.store.set(&previous_key(key), &raw);
        }
    }

    /// Wipe all known keys when the stored schema marker is absent or behind
    /// `expected`, then record `expected`. Runs before any read at startup;
    /// cheap no-op when already current.
    pub fn ensure_schema_version(&self, expected: u32) {
        let stored = self
            .store
            .get(keys::SCHEMA_VERSION)
            .and_then(|raw| raw.trim().parse::<u32>().ok());

        match stored {
            Some(version) if version >= expected => {}
            stored => {
                info!(?stored, expected, "cache schema outdated, evicting all entries");
                for key in EVICT_ON_UPGRADE {
                    self.store.remove(key);
                }
                self.store.set(keys::SCHEMA_VERSION, &expected.to_string());
            }
        }
    }
}
