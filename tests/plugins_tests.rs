//! Tests for loading plugin snapshots
//!
//! Covers JSON snapshots and mod manager profile directories
//! (`plugins.txt` with an optional `loadorder.txt`).

use std::fs;

use plugin_cleaner::plugins::{PluginRecord, PluginSnapshot, UNKNOWN_PRIORITY};
use plugin_cleaner::profiles::GameProfile;
use plugin_cleaner::types::GameId;
use tempfile::TempDir;

fn record<'a>(snapshot: &'a PluginSnapshot, name: &str) -> &'a PluginRecord {
    snapshot
        .plugins
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("{} not loaded", name))
}

#[test]
fn test_json_snapshot_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("plugins.json");
    let snapshot = PluginSnapshot::new(
        Some(GameId::Fnv),
        vec![
            PluginRecord::new("FalloutNV.esm", 0, true),
            PluginRecord::new("DeadMoney.esm", 1, true),
            PluginRecord::new("YUP.esm", 2, false),
        ],
    );

    snapshot.save_to_file(&path).expect("save");
    let loaded = PluginSnapshot::load_from_file(&path).expect("load");

    assert_eq!(loaded.game, Some(GameId::Fnv));
    assert_eq!(loaded.plugins, snapshot.plugins);
    assert_eq!(loaded.priorities().priority_of("YUP.esm"), 2);
    assert_eq!(loaded.priorities().priority_of("Missing.esp"), UNKNOWN_PRIORITY);
}

#[test]
fn test_json_snapshot_without_game() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("plugins.json");
    fs::write(
        &path,
        r#"{ "plugins": [ { "name": "A.esp", "priority": 3, "active": true } ] }"#,
    )
    .expect("write");

    let loaded = PluginSnapshot::load_from_file(&path).expect("load");
    assert_eq!(loaded.game, None);
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_plugins_txt_only() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("plugins.txt"),
        "# This file is used by the game\n\n*Unofficial Patch.esp\nDisabled.esp\n*Weapons.esp\n",
    )
    .expect("write");

    let profile = GameProfile::builtin(GameId::Sse);
    let snapshot = PluginSnapshot::load_from_profile_dir(dir.path(), &profile).expect("load");

    assert_eq!(snapshot.game, Some(GameId::Sse));
    assert_eq!(snapshot.len(), 3);
    assert_eq!(record(&snapshot, "Unofficial Patch.esp").priority, 0);
    assert!(record(&snapshot, "Unofficial Patch.esp").active);
    assert_eq!(record(&snapshot, "Disabled.esp").priority, 1);
    assert!(!record(&snapshot, "Disabled.esp").active);
    assert_eq!(record(&snapshot, "Weapons.esp").priority, 2);
}

#[test]
fn test_load_order_sets_priorities_and_implicit_masters() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("plugins.txt"),
        "*Weapons.esp\n*Unofficial Patch.esp\nDisabled.esp\n",
    )
    .expect("write");
    fs::write(
        dir.path().join("loadorder.txt"),
        "Skyrim.esm\nUpdate.esm\nUnofficial Patch.esp\nDisabled.esp\nWeapons.esp\n",
    )
    .expect("write");

    let profile = GameProfile::builtin(GameId::Sse);
    let snapshot = PluginSnapshot::load_from_profile_dir(dir.path(), &profile).expect("load");

    assert_eq!(snapshot.len(), 5);
    // Implicitly loaded by the game
    assert!(record(&snapshot, "Skyrim.esm").active);
    assert!(record(&snapshot, "Update.esm").active);
    assert_eq!(record(&snapshot, "Unofficial Patch.esp").priority, 2);
    assert_eq!(record(&snapshot, "Weapons.esp").priority, 4);
    assert!(!record(&snapshot, "Disabled.esp").active);
}

#[test]
fn test_plugin_missing_from_load_order_goes_last() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("plugins.txt"), "*Late.esp\n*Early.esp\n").expect("write");
    fs::write(dir.path().join("loadorder.txt"), "Early.esp\n").expect("write");

    let profile = GameProfile::builtin(GameId::Sse);
    let snapshot = PluginSnapshot::load_from_profile_dir(dir.path(), &profile).expect("load");

    assert_eq!(record(&snapshot, "Early.esp").priority, 0);
    assert_eq!(record(&snapshot, "Late.esp").priority, 1);
    assert!(record(&snapshot, "Late.esp").active);
}

#[test]
fn test_missing_plugins_txt_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let profile = GameProfile::builtin(GameId::Fo4);
    assert!(PluginSnapshot::load_from_profile_dir(dir.path(), &profile).is_err());
}

#[test]
fn test_byte_order_mark_is_ignored() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("plugins.txt"),
        "\u{feff}*First.esp\n*Second.esp\n",
    )
    .expect("write");
    fs::write(
        dir.path().join("loadorder.txt"),
        "\u{feff}Skyrim.esm\nFirst.esp\nSecond.esp\n",
    )
    .expect("write");

    let profile = GameProfile::builtin(GameId::Sse);
    let snapshot = PluginSnapshot::load_from_profile_dir(dir.path(), &profile).expect("load");

    assert_eq!(snapshot.len(), 3);
    assert!(record(&snapshot, "Skyrim.esm").active);
    assert_eq!(record(&snapshot, "First.esp").priority, 1);
    assert!(record(&snapshot, "First.esp").active);
}

#[test]
fn test_legacy_code_page_plugins_txt_still_loads() {
    let dir = TempDir::new().expect("tempdir");
    // "Über.esp" in Windows-1252
    fs::write(
        dir.path().join("plugins.txt"),
        b"*\xdcber.esp\n*Plain.esp\n",
    )
    .expect("write");

    let profile = GameProfile::builtin(GameId::Sse);
    let snapshot = PluginSnapshot::load_from_profile_dir(dir.path(), &profile).expect("load");

    assert_eq!(snapshot.len(), 2);
    assert!(record(&snapshot, "\u{fffd}ber.esp").active);
    assert_eq!(record(&snapshot, "Plain.esp").priority, 1);
}
