//! Fetch orchestration
//!
//! Single entry point for current spawn data, implementing the freshness and
//! fallback policy over the versioned cache. A fresh cache entry is served
//! without a network call. When the entry is stale, absent, or the caller
//! forces a refresh, the prior snapshot is promoted to the `_previous` slot,
//! both modes are re-fetched, remapped, supplemented, diffed against the
//! promoted snapshot, and cached. A failed fetch falls back to the most
//! recent cache entry regardless of age; with no cache at all the failure is
//! fatal and the tracker latches against automatic retries until an explicit
//! reset.
//!
//! Overlapping refresh attempts are serialized by a gate; a caller that
//! waited out someone else's refresh re-checks freshness instead of issuing
//! a duplicate network call.

mod error;
mod upstream;


pub use error::{FetchError, SnapshotError};
pub use upstream::{GraphqlSpawnSource, SpawnSource};

use std::sync::atomic::{AtomicBool, Ordering};

use bosswatch_types::{ChangeRecord, GameMode, ModeSnapshots};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{
    SCHEMA_VERSION, SNAPSHOT_TTL_MS, StoragePort, VersionedCache, keys, previous_key,
};
use crate::diff::diff_snapshots;
use crate::game_data;

/// Result of one pass through the freshness policy.
#[derive(Debug)]
pub struct SyncOutcome {
    pub snapshots: ModeSnapshots,
    /// Diff of the promoted previous snapshot against the fresh one, per
    /// mode, sharing one timestamp. Empty when served from cache or when no
    /// previous snapshot exists yet.
    pub changes: Vec<ChangeRecord>,
    /// Whether a network refresh actually ran.
    pub refreshed: bool,
}

/// Sole writer to the versioned cache. Consumers read through it; nothing
/// else touches the snapshot keys.
pub struct SpawnTracker<S, U> {
    cache: VersionedCache<S>,
    source: U,
    refresh_gate: Mutex<()>,
    blocked: AtomicBool,
}

impl<S: StoragePort, U: SpawnSource> SpawnTracker<S, U> {
    /// Runs the schema gate before anything reads the store.
    pub fn new(store: S, source: U) -> Self {
        let cache = VersionedCache::new(store);
        cache.ensure_schema_version(SCHEMA_VERSION);
        Self {
            cache,
            source,
            refresh_gate: Mutex::new(()),
            blocked: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &VersionedCache<S> {
        &self.cache
    }

    /// True after a fatal fetch failure until [`reset`](Self::reset).
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Explicit user-initiated recovery from the fatal-failure latch.
    pub fn reset(&self) {
        self.blocked.store(false, Ordering::SeqCst);
    }

    /// Most recent cached snapshots regardless of freshness.
    pub fn cached_snapshots(&self) -> Option<ModeSnapshots> {
        self.cache
            .read::<ModeSnapshots>(keys::SNAPSHOTS)
            .map(|entry| entry.data)
    }

    /// The snapshot as of just before the latest refresh, for diffing.
    pub fn previous_snapshots(&self) -> Option<ModeSnapshots> {
        self.cache
            .read::<ModeSnapshots>(&previous_key(keys::SNAPSHOTS))
            .map(|entry| entry.data)
    }

    /// Current snapshots for both modes under the freshness policy.
    pub async fn snapshots(&self, force_refresh: bool) -> Result<ModeSnapshots, SnapshotError> {
        self.sync(force_refresh).await.map(|outcome| outcome.snapshots)
    }

    /// Timer-driven entry point. Refuses to touch the network while the
    /// fatal-failure latch is set, so a degraded upstream is not hammered by
    /// the periodic refresh loop.
    pub async fn auto_sync(&self) -> Result<SyncOutcome, SnapshotError> {
        if self.is_blocked() {
            debug!("automatic refresh suppressed by fatal-failure latch");
            return Err(SnapshotError::Blocked);
        }
        self.sync(false).await
    }

    /// Full policy pass. `force_refresh` skips the freshness check and also
    /// clears the latch: a forced fetch is an explicit user action.
    pub async fn sync(&self, force_refresh: bool) -> Result<SyncOutcome, SnapshotError> {
        if force_refresh {
            self.reset();
        } else if let Some(entry) = self.cache.read::<ModeSnapshots>(keys::SNAPSHOTS)
            && entry.is_fresh(SNAPSHOT_TTL_MS)
        {
            debug!("serving fresh cached snapshots");
            return Ok(SyncOutcome {
                snapshots: entry.data,
                changes: Vec::new(),
                refreshed: false,
            });
        }
        self.refresh(force_refresh).await
    }

    async fn refresh(&self, force_refresh: bool) -> Result<SyncOutcome, SnapshotError> {
        let _gate = self.refresh_gate.lock().await;

        // A refresh that completed while we waited on the gate makes this
        // call redundant; forced calls still go through.
        if !force_refresh
            && let Some(entry) = self.cache.read::<ModeSnapshots>(keys::SNAPSHOTS)
            && entry.is_fresh(SNAPSHOT_TTL_MS)
        {
            return Ok(SyncOutcome {
                snapshots: entry.data,
                changes: Vec::new(),
                refreshed: false,
            });
        }

        self.cache.promote_to_previous(keys::SNAPSHOTS);

        match self.fetch_both().await {
            Ok(snapshots) => {
                self.cache.write(keys::SNAPSHOTS, &snapshots);
                let changes = self.diff_against_previous(&snapshots);
                info!(
                    maps_regular = snapshots.regular.len(),
                    maps_pve = snapshots.pve.len(),
                    changes = changes.len(),
                    "snapshot refresh complete"
                );
                Ok(SyncOutcome {
                    snapshots,
                    changes,
                    refreshed: true,
                })
            }
            Err(err) => {
                if let Some(entry) = self.cache.read::<ModeSnapshots>(keys::SNAPSHOTS) {
                    warn!(%err, "fetch failed, serving stale cached snapshots");
                    Ok(SyncOutcome {
                        snapshots: entry.data,
                        changes: Vec::new(),
                        refreshed: false,
                    })
                } else {
                    self.blocked.store(true, Ordering::SeqCst);
                    warn!(%err, "fetch failed with no cache fallback, latching refresh");
                    Err(SnapshotError::NoFallback(err))
                }
            }
        }
    }

    async fn fetch_both(&self) -> Result<ModeSnapshots, FetchError> {
        let regular = self.source.fetch(GameMode::Regular).await?;
        let pve = self.source.fetch(GameMode::Pve).await?;

        let mut snapshots = ModeSnapshots { regular, pve };
        for mode in GameMode::ALL {
            let maps = snapshots.for_mode_mut(mode);
            game_data::apply_name_remaps(maps);
            game_data::merge_supplements(maps, game_data::supplemental_entries());
        }
        Ok(snapshots)
    }

    /// Diff both modes against the promoted previous snapshot. All records
    /// from one refresh share one timestamp. A missing previous snapshot
    /// (first ever refresh) produces no records rather than reporting the
    /// whole world as added.
    fn diff_against_previous(&self, current: &ModeSnapshots) -> Vec<ChangeRecord> {
        let Some(previous) = self.previous_snapshots() else {
            return Vec::new();
        };

        let timestamp = Utc::now().timestamp_millis();
        let mut changes = Vec::new();
        for mode in GameMode::ALL {
            changes.extend(diff_snapshots(
                Some(previous.for_mode(mode)),
                Some(current.for_mode(mode)),
                mode,
                timestamp,
            ));
        }
        changes
    }
}
