//! Structural diff between two spawn snapshots of one mode.
//!
//! Emits one change record per observed addition, spawn-chance change, or
//! newly appearing location. The diff is one-directional: a boss or location
//! disappearing from the new snapshot produces no record. Removal tracking
//! would change the external change-log shape and is deliberately absent.

use bosswatch_types::{ChangeField, ChangeRecord, GameMode, MapEntry};
use hashbrown::{HashMap, HashSet};

use crate::identity::normalize_boss_name;

/// Values shown in `status` records for a newly appearing boss.
const NOT_PRESENT: &str = "Not Present";
const ADDED: &str = "Added";

/// Spawn chances are displayed as whole-number percentages.
pub fn format_percent(chance: f64) -> String {
    format!("{}%", (chance * 100.0).round() as i64)
}

/// One logical (map, boss) entity after folding duplicate encounters.
///
/// The supplement merge appends encounters without dedup, so the same
/// normalized identity can occur twice on one map. Folding both sides the
/// same way (first spawn chance wins, location sets union) keeps the diff
/// stable across repeated runs over identical data.
struct EncounterView {
    map: String,
    identity: String,
    spawn_chance: f64,
    /// First-seen order, unique, placeholder filtered.
    locations: Vec<String>,
}

fn collapse(maps: &[MapEntry]) -> Vec<EncounterView> {
    let mut views: Vec<EncounterView> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for map in maps {
        for encounter in &map.bosses {
            let identity =
                normalize_boss_name(&encounter.boss.name, encounter.spawn_chance).to_string();
            let key = (map.name.clone(), identity.clone());
            let slot = *index.entry(key).or_insert_with(|| {
                views.push(EncounterView {
                    map: map.name.clone(),
                    identity,
                    spawn_chance: encounter.spawn_chance,
                    locations: Vec::new(),
                });
                views.len() - 1
            });

            let view = &mut views[slot];
            for location in &encounter.spawn_locations {
                if location.is_unknown_placeholder() {
                    continue;
                }
                if !view.locations.iter().any(|name| name == &location.name) {
                    view.locations.push(location.name.clone());
                }
            }
        }
    }
    views
}

/// Compute the observable changes between two snapshots of one mode.
///
/// All emitted records share the caller-supplied `timestamp`, making the
/// output deterministic for a given pair of snapshots and instant. A missing
/// old snapshot reports every new boss as added; a missing new snapshot
/// reports nothing.
pub fn diff_snapshots(
    old: Option<&[MapEntry]>,
    new: Option<&[MapEntry]>,
    mode: GameMode,
    timestamp: i64,
) -> Vec<ChangeRecord> {
    let Some(new_maps) = new else {
        return Vec::new();
    };

    let old_views = collapse(old.unwrap_or(&[]));
    let mut prior: HashMap<(&str, &str), (f64, HashSet<&str>)> = HashMap::new();
    for view in &old_views {
        prior.insert(
            (view.map.as_str(), view.identity.as_str()),
            (
                view.spawn_chance,
                view.locations.iter().map(String::as_str).collect(),
            ),
        );
    }

    let mut records = Vec::new();
    let record = |view: &EncounterView, field, old_value: String, new_value: String| ChangeRecord {
        map: view.map.clone(),
        boss: view.identity.clone(),
        field,
        old_value,
        new_value,
        timestamp,
        game_mode: mode,
    };

    for view in collapse(new_maps) {
        match prior.get(&(view.map.as_str(), view.identity.as_str())) {
            None => {
                // A brand-new entity gets exactly one record; its locations
                // are not individually reported.
                records.push(record(
                    &view,
                    ChangeField::Status,
                    NOT_PRESENT.to_string(),
                    ADDED.to_string(),
                ));
            }
            Some((old_chance, old_locations)) => {
                if *old_chance != view.spawn_chance {
                    records.push(record(
                        &view,
                        ChangeField::SpawnChance,
                        format_percent(*old_chance),
                        format_percent(view.spawn_chance),
                    ));
                }
                for location in &view.locations {
                    if !old_locations.contains(location.as_str()) {
                        records.push(record(
                            &view,
                            ChangeField::Location,
                            NOT_PRESENT.to_string(),
                            location.clone(),
                        ));
                    }
                }
            }
        }
    }
    records
}

#[cfg(test)]
mod tests;
