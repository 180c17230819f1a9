use super::*;
use bosswatch_types::{BossEncounter, BossInfo, SpawnLocation};

const T: i64 = 1_700_000_000_000;

fn location(name: &str, chance: f64) -> SpawnLocation {
    SpawnLocation {
        name: name.to_string(),
        chance,
    }
}

fn encounter(name: &str, chance: f64, locations: Vec<SpawnLocation>) -> BossEncounter {
    BossEncounter {
        boss: BossInfo::named(name),
        spawn_chance: chance,
        spawn_locations: locations,
    }
}

fn map(name: &str, bosses: Vec<BossEncounter>) -> MapEntry {
    MapEntry {
        name: name.to_string(),
        bosses,
    }
}

#[test]
fn addition_emits_exactly_one_status_record() {
    let old = vec![map("Interchange", Vec::new())];
    let new = vec![map(
        "Interchange",
        vec![encounter("Killa", 0.75, vec![location("OLI", 0.2)])],
    )];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Regular, T);

    // One record total: the addition supersedes location-level tracking
    // for a brand-new entity.
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.map, "Interchange");
    assert_eq!(record.boss, "Killa");
    assert_eq!(record.field, ChangeField::Status);
    assert_eq!(record.old_value, "Not Present");
    assert_eq!(record.new_value, "Added");
    assert_eq!(record.timestamp, T);
    assert_eq!(record.game_mode, GameMode::Regular);
}

#[test]
fn spawn_chance_change_formats_whole_percentages() {
    let old = vec![map("Customs", vec![encounter("Reshala", 0.6, Vec::new())])];
    let new = vec![map("Customs", vec![encounter("Reshala", 0.75, Vec::new())])];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Regular, T);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].field, ChangeField::SpawnChance);
    assert_eq!(records[0].old_value, "60%");
    assert_eq!(records[0].new_value, "75%");
}

#[test]
fn new_location_emits_one_location_record() {
    let old = vec![map(
        "Woods",
        vec![encounter("Shturman", 0.75, vec![location("Sawmill", 0.5)])],
    )];
    let new = vec![map(
        "Woods",
        vec![encounter(
            "Shturman",
            0.75,
            vec![location("Sawmill", 0.5), location("Lumber Mill", 0.3)],
        )],
    )];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Pve, T);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.field, ChangeField::Location);
    assert_eq!(record.old_value, "Not Present");
    assert_eq!(record.new_value, "Lumber Mill");
    assert_eq!(record.game_mode, GameMode::Pve);
}

#[test]
fn identical_snapshots_produce_no_records() {
    let snapshot = vec![map(
        "Shoreline",
        vec![encounter(
            "Sanitar",
            0.4,
            vec![location("Resort", 0.6), location("Pier", 0.2)],
        )],
    )];

    let records = diff_snapshots(Some(&snapshot), Some(&snapshot), GameMode::Regular, T);
    assert!(records.is_empty());
}

#[test]
fn removals_are_not_reported() {
    let old = vec![map(
        "Customs",
        vec![
            encounter("Reshala", 0.35, vec![location("Dorms", 0.5)]),
            encounter("Killa", 0.2, Vec::new()),
        ],
    )];
    // Killa gone, Dorms gone
    let new = vec![map("Customs", vec![encounter("Reshala", 0.35, Vec::new())])];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Regular, T);
    assert!(records.is_empty());
}

#[test]
fn missing_old_snapshot_reports_everything_added() {
    let new = vec![map(
        "Reserve",
        vec![
            encounter("Glukhar", 0.3, Vec::new()),
            encounter("Raiders", 1.0, Vec::new()),
        ],
    )];

    let records = diff_snapshots(None, Some(&new), GameMode::Regular, T);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.field == ChangeField::Status));
}

#[test]
fn missing_new_snapshot_reports_nothing() {
    let old = vec![map("Customs", vec![encounter("Reshala", 0.35, Vec::new())])];
    assert!(diff_snapshots(Some(&old), None, GameMode::Regular, T).is_empty());
}

#[test]
fn unknown_placeholder_location_is_ignored() {
    let old = vec![map("Customs", vec![encounter("Reshala", 0.35, Vec::new())])];
    let new = vec![map(
        "Customs",
        vec![encounter(
            "Reshala",
            0.35,
            vec![location("Unknown", 0.0), location("Dorms", 0.5)],
        )],
    )];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Regular, T);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].new_value, "Dorms");
}

#[test]
fn infected_identity_split_drives_the_comparison() {
    // Guaranteed horde in the old snapshot, rare roamer in the new one:
    // different identities, so the rare variant counts as an addition.
    let old = vec![map("Ground Zero", vec![encounter("infected", 1.0, Vec::new())])];
    let new = vec![map("Ground Zero", vec![encounter("infected", 0.35, Vec::new())])];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Pve, T);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].boss, "Infected (Rare)");
    assert_eq!(records[0].field, ChangeField::Status);
}

#[test]
fn infected_same_rare_identity_diffs_spawn_chance() {
    let old = vec![map("Ground Zero", vec![encounter("infected", 0.2, Vec::new())])];
    let new = vec![map("Ground Zero", vec![encounter("infected", 0.4, Vec::new())])];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Pve, T);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].boss, "Infected (Rare)");
    assert_eq!(records[0].field, ChangeField::SpawnChance);
    assert_eq!(records[0].old_value, "20%");
    assert_eq!(records[0].new_value, "40%");
}

#[test]
fn duplicate_encounters_fold_without_self_diffing() {
    // Supplement merge appends a duplicate encounter on both sides; the
    // folded views must match and produce no records.
    let snapshot = vec![map(
        "Customs",
        vec![
            encounter("Cultist Priest", 0.35, vec![location("Dorms", 0.2)]),
            encounter("Cultist Priest", 0.25, vec![location("Crackhouse", 0.1)]),
        ],
    )];

    let records = diff_snapshots(Some(&snapshot), Some(&snapshot), GameMode::Regular, T);
    assert!(records.is_empty());
}

#[test]
fn same_boss_on_two_maps_tracked_independently() {
    let old = vec![
        map("Customs", vec![encounter("Goons", 0.2, Vec::new())]),
        map("Woods", vec![encounter("Goons", 0.2, Vec::new())]),
    ];
    let new = vec![
        map("Customs", vec![encounter("Goons", 0.2, Vec::new())]),
        map("Woods", vec![encounter("Goons", 0.5, Vec::new())]),
    ];

    let records = diff_snapshots(Some(&old), Some(&new), GameMode::Regular, T);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].map, "Woods");
}

#[test]
fn percent_formatting_rounds_to_whole_numbers() {
    assert_eq!(format_percent(0.6), "60%");
    assert_eq!(format_percent(0.753), "75%");
    assert_eq!(format_percent(0.005), "1%");
    assert_eq!(format_percent(0.0), "0%");
    assert_eq!(format_percent(1.0), "100%");
}
