//! Tests for opening a cleaning session
//!
//! These tests verify game resolution order, profile overrides and an
//! end-to-end dry run from a snapshot file.

use std::fs;

use plugin_cleaner::batch::CancellationToken;
use plugin_cleaner::launcher::DryRunLauncher;
use plugin_cleaner::plugins::{PluginRecord, PluginSnapshot};
use plugin_cleaner::session::{PluginSource, Session};
use plugin_cleaner::settings::CleanerSettings;
use plugin_cleaner::types::GameId;
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir, game: Option<GameId>) -> PluginSource {
    let path = dir.path().join("plugins.json");
    PluginSnapshot::new(
        game,
        vec![
            PluginRecord::new("Fallout4.esm", 0, true),
            PluginRecord::new("DLCRobot.esm", 1, true),
            PluginRecord::new("ccbgsfo4001-pipboy(black).esl", 2, true),
            PluginRecord::new("Armor.esp", 3, true),
            PluginRecord::new("Weapons.esp", 4, true),
        ],
    )
    .save_to_file(&path)
    .expect("save snapshot");
    PluginSource::Snapshot(path)
}

#[test]
fn test_game_from_snapshot() {
    let dir = TempDir::new().expect("tempdir");
    let source = write_snapshot(&dir, Some(GameId::Fo4));
    let session = Session::open(CleanerSettings::default(), &source, None).expect("open");
    assert_eq!(session.profile.id, GameId::Fo4);
}

#[test]
fn test_cli_game_wins_over_snapshot_and_settings() {
    let dir = TempDir::new().expect("tempdir");
    let source = write_snapshot(&dir, Some(GameId::Fo4));
    let settings = CleanerSettings {
        game: Some(GameId::Sse),
        ..Default::default()
    };
    let session = Session::open(settings, &source, Some(GameId::Fo4vr)).expect("open");
    assert_eq!(session.profile.id, GameId::Fo4vr);
}

#[test]
fn test_missing_game_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let source = write_snapshot(&dir, None);
    assert!(Session::open(CleanerSettings::default(), &source, None).is_err());
}

#[test]
fn test_invalid_settings_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let source = write_snapshot(&dir, Some(GameId::Fo4));
    let settings = CleanerSettings {
        explicit_ini_path: true,
        ..Default::default()
    };
    assert!(Session::open(settings, &source, None).is_err());
}

#[test]
fn test_profile_override_file() {
    let dir = TempDir::new().expect("tempdir");
    let source = write_snapshot(&dir, Some(GameId::Fo4));
    let overrides = dir.path().join("profiles.json");
    fs::write(
        &overrides,
        r#"[{
            "id": "fo4",
            "display_name": "Fallout 4 (custom)",
            "cleaner_executable": "FO4EditCustom",
            "game_switch": "-fo4",
            "main_masters": ["Fallout4.esm", "DLCRobot.esm"]
        }]"#,
    )
    .expect("write overrides");
    let settings = CleanerSettings {
        profiles_file: Some(overrides),
        ..Default::default()
    };

    let session = Session::open(settings, &source, None).expect("open");
    assert_eq!(session.profile.cleaner_executable, "FO4EditCustom");
    let names: Vec<String> = session
        .selection()
        .entries()
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    assert!(!names.contains(&"DLCRobot.esm".to_string()));
}

#[test]
fn test_dry_run_cleans_default_selection() {
    let dir = TempDir::new().expect("tempdir");
    let source = write_snapshot(&dir, Some(GameId::Fo4));
    let session = Session::open(CleanerSettings::default(), &source, None).expect("open");

    let selected = session.selection().checked_names();
    assert_eq!(
        selected,
        vec!["ccbgsfo4001-pipboy(black).esl", "Armor.esp", "Weapons.esp"]
    );

    let mut launcher = DryRunLauncher::new();
    let token = CancellationToken::new();
    let result = session.run(&selected, &mut launcher, &token, |_| {});

    assert_eq!(result.succeeded_count, 3);
    let order: Vec<&str> = launcher
        .invocations
        .iter()
        .map(|(_, args)| args.last().map(String::as_str).unwrap_or_default())
        .collect();
    assert_eq!(
        order,
        vec![
            "\"Weapons.esp\"",
            "\"Armor.esp\"",
            "\"ccbgsfo4001-pipboy(black).esl\""
        ]
    );
    assert!(launcher.invocations.iter().all(|(exe, _)| exe == "FO4Edit"));
}
