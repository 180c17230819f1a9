//! Shared data types for bosswatch
//!
//! This crate contains the serializable snapshot model, change-record types,
//! and app configuration shared between the sync core (bosswatch-core) and
//! the CLI frontend. No I/O lives here.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Game Mode
// ─────────────────────────────────────────────────────────────────────────────

/// The two parallel rule variants spawn data is tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Standard (PvP) servers
    Regular,
    /// PvE servers
    Pve,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Regular, GameMode::Pve];

    /// Name used by the upstream API and the change-log wire contract.
    pub fn wire_name(&self) -> &'static str {
        match self {
            GameMode::Regular => "regular",
            GameMode::Pve => "pve",
        }
    }

    /// Label shown to users and stored in change records.
    pub fn display_label(&self) -> &'static str {
        match self {
            GameMode::Regular => "PvP",
            GameMode::Pve => "PvE",
        }
    }

    /// Map a raw upstream mode string. Only `"regular"` maps to the standard
    /// mode; every other value is treated as PvE.
    pub fn from_wire(raw: &str) -> GameMode {
        if raw == "regular" {
            GameMode::Regular
        } else {
            GameMode::Pve
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Model
// ─────────────────────────────────────────────────────────────────────────────

/// A named sub-location with the conditional probability of the boss spawning
/// there, given that it spawned at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnLocation {
    pub name: String,
    pub chance: f64,
}

impl SpawnLocation {
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    /// The upstream feed uses `"Unknown"` at chance 0 to mean "no specific
    /// location known". Location-level displays and diffing skip it.
    pub fn is_unknown_placeholder(&self) -> bool {
        self.name == Self::UNKNOWN_NAME && self.chance == 0.0
    }
}

/// Auxiliary boss fields carried through from the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub escorts: Vec<String>,
}

impl BossInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health: None,
            portrait: None,
            escorts: Vec::new(),
        }
    }
}

/// One boss appearing on one map, with its overall spawn probability and
/// per-location conditional probabilities.
///
/// A map may hold multiple encounters with the same raw boss name (the
/// supplement merge appends rather than replaces); consumers that need one
/// logical entity per (map, boss) merge by normalized identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossEncounter {
    pub boss: BossInfo,
    pub spawn_chance: f64,
    pub spawn_locations: Vec<SpawnLocation>,
}

/// All boss encounters for one map, unique by `name` within a snapshot.
/// Snapshots are replaced wholesale on refresh, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub name: String,
    pub bosses: Vec<BossEncounter>,
}

/// One full pull of spawn data for both modes, cached as a single unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeSnapshots {
    pub regular: Vec<MapEntry>,
    pub pve: Vec<MapEntry>,
}

impl ModeSnapshots {
    pub fn for_mode(&self, mode: GameMode) -> &[MapEntry] {
        match mode {
            GameMode::Regular => &self.regular,
            GameMode::Pve => &self.pve,
        }
    }

    pub fn for_mode_mut(&mut self, mode: GameMode) -> &mut Vec<MapEntry> {
        match mode {
            GameMode::Regular => &mut self.regular,
            GameMode::Pve => &mut self.pve,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Change Records
// ─────────────────────────────────────────────────────────────────────────────

/// Which aspect of a boss encounter a change record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeField {
    /// Boss newly present on a map
    Status,
    /// Overall spawn probability changed
    SpawnChance,
    /// New spawn location appeared
    Location,
}

impl ChangeField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ChangeField::Status => "status",
            ChangeField::SpawnChance => "spawnChance",
            ChangeField::Location => "location",
        }
    }

    pub fn from_wire(raw: &str) -> Option<ChangeField> {
        match raw {
            "status" => Some(ChangeField::Status),
            "spawnChance" => Some(ChangeField::SpawnChance),
            "location" => Some(ChangeField::Location),
            _ => None,
        }
    }
}

/// One discrete, timestamped observation of a difference between two
/// snapshots. Append-only; never mutated after creation. Identity is the
/// (map, boss, field, timestamp) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub map: String,
    pub boss: String,
    pub field: ChangeField,
    pub old_value: String,
    pub new_value: String,
    /// Epoch milliseconds; shared by all records from one diff invocation.
    pub timestamp: i64,
    pub game_mode: GameMode,
}

// ─────────────────────────────────────────────────────────────────────────────
// App Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted application configuration. TTLs and the cache schema version are
/// compile-time constants in bosswatch-core, not configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream spawn-data GraphQL endpoint.
    #[serde(default = "default_spawn_endpoint")]
    pub spawn_endpoint: String,
    /// Append-only change-record store endpoint.
    #[serde(default = "default_change_log_endpoint")]
    pub change_log_endpoint: String,
    /// Override for the on-disk cache directory; platform data dir when unset.
    #[serde(default)]
    pub cache_dir: Option<String>,
}

fn default_spawn_endpoint() -> String {
    "https://api.tarkov.dev/graphql".to_string()
}

fn default_change_log_endpoint() -> String {
    "https://bosswatch-changes.workers.dev/changes".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spawn_endpoint: default_spawn_endpoint(),
            change_log_endpoint: default_change_log_endpoint(),
            cache_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_mode_wire_round_trip() {
        assert_eq!(GameMode::from_wire("regular"), GameMode::Regular);
        assert_eq!(GameMode::from_wire("pve"), GameMode::Pve);
        // Unrecognized raw values fall back to PvE
        assert_eq!(GameMode::from_wire("arena"), GameMode::Pve);
        assert_eq!(GameMode::Regular.display_label(), "PvP");
        assert_eq!(GameMode::Pve.display_label(), "PvE");
    }

    #[test]
    fn change_field_wire_names() {
        for field in [
            ChangeField::Status,
            ChangeField::SpawnChance,
            ChangeField::Location,
        ] {
            assert_eq!(ChangeField::from_wire(field.wire_name()), Some(field));
        }
        assert_eq!(ChangeField::from_wire("health"), None);
    }

    #[test]
    fn unknown_placeholder_requires_both_name_and_zero_chance() {
        let placeholder = SpawnLocation {
            name: "Unknown".to_string(),
            chance: 0.0,
        };
        assert!(placeholder.is_unknown_placeholder());

        let named_zero = SpawnLocation {
            name: "Dorms".to_string(),
            chance: 0.0,
        };
        assert!(!named_zero.is_unknown_placeholder());

        let unknown_nonzero = SpawnLocation {
            name: "Unknown".to_string(),
            chance: 0.1,
        };
        assert!(!unknown_nonzero.is_unknown_placeholder());
    }
}
