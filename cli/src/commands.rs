//! CLI command implementations.

use std::time::Duration;

use bosswatch_core::{
    AppConfig, AppConfigExt, ChangeLogClient, FileStore, GraphqlSpawnSource, SnapshotError,
    SpawnTracker, diff_snapshots, format_percent, normalize_boss_name,
};
use bosswatch_types::{ChangeRecord, GameMode, MapEntry};
use chrono::{TimeZone, Utc};
use tracing::{debug, info, warn};

type Tracker = SpawnTracker<FileStore, GraphqlSpawnSource>;

fn build_store(config: &AppConfig) -> Result<FileStore, String> {
    FileStore::new(config.resolved_cache_dir()).map_err(|e| e.to_string())
}

fn build_tracker(config: &AppConfig, store: FileStore) -> Tracker {
    SpawnTracker::new(store, GraphqlSpawnSource::new(&config.spawn_endpoint))
}

/// Fetch current snapshots under the freshness policy and print a summary.
pub async fn fetch(force: bool) -> Result<(), String> {
    let config = AppConfig::load();
    let store = build_store(&config)?;
    let tracker = build_tracker(&config, store);

    let snapshots = tracker.snapshots(force).await.map_err(|e| e.to_string())?;
    for mode in GameMode::ALL {
        print_mode_summary(mode, snapshots.for_mode(mode));
    }
    Ok(())
}

/// Diff the previous snapshot against the current cached one, read-only
/// unless `submit` is set. Does not touch the network for snapshot data.
pub async fn diff(submit: bool) -> Result<(), String> {
    let config = AppConfig::load();
    let store = build_store(&config)?;
    let tracker = build_tracker(&config, store.clone());

    let Some(current) = tracker.cached_snapshots() else {
        println!("No cached snapshot; run `bosswatch fetch` first");
        return Ok(());
    };
    let Some(previous) = tracker.previous_snapshots() else {
        println!("No previous snapshot to diff against yet");
        return Ok(());
    };

    let timestamp = Utc::now().timestamp_millis();
    let mut records = Vec::new();
    for mode in GameMode::ALL {
        records.extend(diff_snapshots(
            Some(previous.for_mode(mode)),
            Some(current.for_mode(mode)),
            mode,
            timestamp,
        ));
    }

    if records.is_empty() {
        println!("No changes");
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }

    if submit {
        let client = ChangeLogClient::new(&config.change_log_endpoint, store);
        client.submit(&records).await.map_err(|e| e.to_string())?;
        println!("Submitted {} change records", records.len());
    }
    Ok(())
}

/// Print the change feed, newest first.
pub async fn changes(since: Option<i64>) -> Result<(), String> {
    let config = AppConfig::load();
    let store = build_store(&config)?;
    let client = ChangeLogClient::new(&config.change_log_endpoint, store);

    let records = client.fetch_since(since).await.map_err(|e| e.to_string())?;
    if records.is_empty() {
        println!("No change records");
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

/// Periodic refresh loop: each tick runs the freshness policy, and any
/// records from an actual refresh are submitted to the change log. A fatal
/// fetch failure latches the tracker; later ticks skip the network until
/// the user resets with `bosswatch fetch --force`.
pub async fn watch(interval_secs: u64) -> Result<(), String> {
    let config = AppConfig::load();
    let store = build_store(&config)?;
    let tracker = build_tracker(&config, store.clone());
    let client = ChangeLogClient::new(&config.change_log_endpoint, store);

    let interval = Duration::from_secs(interval_secs.max(30));
    info!(interval_secs = interval.as_secs(), "watch loop started");
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        match tracker.auto_sync().await {
            Ok(outcome) => {
                if !outcome.refreshed {
                    debug!("cache still fresh");
                    continue;
                }
                if outcome.changes.is_empty() {
                    info!("refresh complete, no changes detected");
                    continue;
                }
                for record in &outcome.changes {
                    print_record(record);
                }
                match client.submit(&outcome.changes).await {
                    Ok(()) => info!(count = outcome.changes.len(), "submitted change records"),
                    Err(err) => warn!(%err, "failed to submit change records"),
                }
            }
            Err(SnapshotError::Blocked) => {
                warn!("refresh latched; run `bosswatch fetch --force` to reset");
            }
            Err(err) => {
                warn!(%err, "refresh failed");
            }
        }
    }
}

/// Print the resolved configuration.
pub fn show_config() -> Result<(), String> {
    let config = AppConfig::load();
    println!("spawn endpoint:      {}", config.spawn_endpoint);
    println!("change log endpoint: {}", config.change_log_endpoint);
    println!(
        "cache directory:     {}",
        config.resolved_cache_dir().display()
    );
    Ok(())
}

fn print_mode_summary(mode: GameMode, maps: &[MapEntry]) {
    println!("=== {} ===", mode.display_label());
    for map in maps {
        println!("{}", map.name);
        for encounter in &map.bosses {
            let identity = normalize_boss_name(&encounter.boss.name, encounter.spawn_chance);
            let locations: Vec<String> = encounter
                .spawn_locations
                .iter()
                .filter(|l| !l.is_unknown_placeholder())
                .map(|l| format!("{} {}", l.name, format_percent(l.chance)))
                .collect();
            if locations.is_empty() {
                println!("  {identity} {}", format_percent(encounter.spawn_chance));
            } else {
                println!(
                    "  {identity} {} ({})",
                    format_percent(encounter.spawn_chance),
                    locations.join(", ")
                );
            }
        }
    }
}

fn print_record(record: &ChangeRecord) {
    let when = Utc
        .timestamp_millis_opt(record.timestamp)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| record.timestamp.to_string());
    println!(
        "[{when}] [{}] {} / {}: {} {} -> {}",
        record.game_mode.display_label(),
        record.map,
        record.boss,
        record.field.wire_name(),
        record.old_value,
        record.new_value
    );
}
