//! Static game data: upstream name remaps and curated supplementary spawns.
//!
//! The upstream feed uses internal code names for a few bosses and omits
//! encounters that are only documented by the community. Both corrections are
//! applied uniformly to every fetched snapshot, for both modes, before the
//! result is cached.

use bosswatch_types::{BossEncounter, BossInfo, MapEntry, SpawnLocation};
use phf::phf_map;

/// Internal code names mapped to public display names.
static NAME_REMAPS: phf::Map<&'static str, &'static str> = phf_map! {
    "knight" => "Death Knight",
};

/// Display name for a raw upstream boss name, unchanged when not remapped.
pub fn remap_boss_name(raw: &str) -> &str {
    NAME_REMAPS.get(raw).copied().unwrap_or(raw)
}

/// Rewrite remapped boss names in place across a fetched snapshot.
pub fn apply_name_remaps(maps: &mut [MapEntry]) {
    for map in maps {
        for encounter in &mut map.bosses {
            if let Some(mapped) = NAME_REMAPS.get(encounter.boss.name.as_str()) {
                encounter.boss.name = (*mapped).to_string();
            }
        }
    }
}

/// Manually curated encounters the upstream feed does not report.
pub fn supplemental_entries() -> Vec<MapEntry> {
    vec![
        MapEntry {
            name: "Customs".to_string(),
            bosses: vec![cultist_priest()],
        },
        MapEntry {
            name: "Woods".to_string(),
            bosses: vec![cultist_priest()],
        },
    ]
}

// Night-only spawn; the feed has no location data for it.
fn cultist_priest() -> BossEncounter {
    BossEncounter {
        boss: BossInfo::named("Cultist Priest"),
        spawn_chance: 0.25,
        spawn_locations: vec![SpawnLocation {
            name: SpawnLocation::UNKNOWN_NAME.to_string(),
            chance: 0.0,
        }],
    }
}

/// Append supplementary entries into a fetched snapshot by map name: an
/// existing map gets its boss list extended, a new map is appended whole.
/// Duplicate bosses are kept as-is; merging by normalized identity is the
/// consumer's concern.
pub fn merge_supplements(maps: &mut Vec<MapEntry>, extra: Vec<MapEntry>) {
    for extra_map in extra {
        match maps.iter_mut().find(|m| m.name == extra_map.name) {
            Some(existing) => existing.bosses.extend(extra_map.bosses),
            None => maps.push(extra_map),
        }
    }
}
