//! Synchronization core for boss spawn tracking.
//!
//! Reconciles repeated snapshots of per-map boss spawn data from a remote
//! source into a durable change log. The pipeline: the fetch orchestrator
//! pulls both game modes through the versioned cache's freshness policy,
//! static remaps and curated supplements are applied, the diff engine
//! compares the promoted previous snapshot against the fresh one, and the
//! change log client ships the resulting records to the external
//! append-only store.

pub mod cache;
pub mod changelog;
pub mod config;
pub mod diff;
pub mod fetch;
pub mod game_data;
pub mod identity;

// Re-exports for convenience
pub use cache::{
    CacheEntry, FileStore, MemoryStore, SCHEMA_VERSION, SNAPSHOT_TTL_MS, StoragePort,
    VersionedCache,
};
pub use changelog::{CHANGE_LOG_TTL_MS, ChangeLogClient, ChangeLogError};
pub use config::{AppConfig, AppConfigExt};
pub use diff::{diff_snapshots, format_percent};
pub use fetch::{
    FetchError, GraphqlSpawnSource, SnapshotError, SpawnSource, SpawnTracker, SyncOutcome,
};
pub use identity::normalize_boss_name;
