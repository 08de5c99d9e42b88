//! Tests for the default checklist
//!
//! These tests verify:
//! - Main masters never reach the checklist
//! - Category flags decide the default check state
//! - Priority and name orderings are each correct on their own

use plugin_cleaner::plugins::PluginRecord;
use plugin_cleaner::profiles::GameProfile;
use plugin_cleaner::selection::{SelectionFlags, SelectionList, build};
use plugin_cleaner::types::{GameId, SortOrder};

fn sse() -> GameProfile {
    GameProfile::builtin(GameId::Sse)
}

fn flags(clean_cc: bool, clean_beth: bool, clean_else: bool) -> SelectionFlags {
    SelectionFlags {
        clean_cc,
        clean_beth,
        clean_else,
        sort_order: SortOrder::Priority,
    }
}

/// Skyrim SE load order with one plugin of every category
fn load_order() -> Vec<PluginRecord> {
    vec![
        PluginRecord::new("Skyrim.esm", 0, true),
        PluginRecord::new("Update.esm", 1, true),
        PluginRecord::new("Dawnguard.esm", 2, true),
        PluginRecord::new("ccbgssse001-fish.esm", 3, true),
        PluginRecord::new("Unofficial Patch.esp", 4, true),
        PluginRecord::new("Disabled.esp", 5, false),
    ]
}

fn checked_of(entries: &[plugin_cleaner::selection::SelectionEntry], name: &str) -> bool {
    entries
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.checked)
        .unwrap_or_else(|| panic!("{} missing from checklist", name))
}

// =============================================================================
// Filtering and default check state
// =============================================================================

#[test]
fn test_main_master_is_not_listed() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let entries = build(&load_order(), &profile, &regex, &flags(true, true, true));

    assert!(entries.iter().all(|entry| entry.name != "Skyrim.esm"));
    assert_eq!(entries.len(), 5);
}

#[test]
fn test_default_flags() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let entries = build(&load_order(), &profile, &regex, &SelectionFlags::default());

    assert!(checked_of(&entries, "ccbgssse001-fish.esm"));
    assert!(!checked_of(&entries, "Update.esm"));
    assert!(!checked_of(&entries, "Dawnguard.esm"));
    assert!(checked_of(&entries, "Unofficial Patch.esp"));
    assert!(!checked_of(&entries, "Disabled.esp"));
}

#[test]
fn test_official_content_only() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let entries = build(&load_order(), &profile, &regex, &flags(false, true, false));

    assert!(checked_of(&entries, "Update.esm"));
    assert!(checked_of(&entries, "Dawnguard.esm"));
    assert!(!checked_of(&entries, "ccbgssse001-fish.esm"));
    assert!(!checked_of(&entries, "Unofficial Patch.esp"));
}

#[test]
fn test_all_flags_off_checks_nothing() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let entries = build(&load_order(), &profile, &regex, &flags(false, false, false));

    assert!(entries.iter().all(|entry| !entry.checked));
}

#[test]
fn test_cc_pattern_must_match_at_start() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let plugins = vec![PluginRecord::new("Fixes-ccbgssse001-fish.esp", 10, true)];

    // Not a CC plugin, so it follows clean_else
    let entries = build(&plugins, &profile, &regex, &flags(true, false, false));
    assert!(!entries[0].checked);
}

// =============================================================================
// Ordering
// =============================================================================

/// Distinct priorities, names deliberately out of alphabetical order
fn unordered_fixture() -> Vec<PluginRecord> {
    vec![
        PluginRecord::new("Delta.esp", 10, true),
        PluginRecord::new("Bravo.esp", 40, true),
        PluginRecord::new("Alpha.esp", 30, true),
        PluginRecord::new("Charlie.esp", 20, true),
    ]
}

fn names(list: &SelectionList) -> Vec<&str> {
    list.entries().iter().map(|entry| entry.name.as_str()).collect()
}

#[test]
fn test_priority_order() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let list =
        SelectionList::new(&unordered_fixture(), &profile, &regex, &flags(true, false, true));

    assert_eq!(
        names(&list),
        vec!["Delta.esp", "Charlie.esp", "Alpha.esp", "Bravo.esp"]
    );
}

#[test]
fn test_name_order() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let mut flags = flags(true, false, true);
    flags.sort_order = SortOrder::Name;
    let list = SelectionList::new(&unordered_fixture(), &profile, &regex, &flags);

    assert_eq!(
        names(&list),
        vec!["Alpha.esp", "Bravo.esp", "Charlie.esp", "Delta.esp"]
    );
}

#[test]
fn test_resort_restores_priority_order() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let mut list =
        SelectionList::new(&unordered_fixture(), &profile, &regex, &flags(true, false, true));
    let by_priority = names(&list)
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    list.sort(SortOrder::Name);
    assert_eq!(names(&list)[0], "Alpha.esp");

    list.sort(SortOrder::Priority);
    assert_eq!(names(&list), by_priority);
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn test_checked_names_follow_display_order() {
    let profile = sse();
    let regex = profile.cc_regex().expect("pattern");
    let mut list =
        SelectionList::new(&unordered_fixture(), &profile, &regex, &flags(false, false, false));

    assert!(list.set_checked("Bravo.esp", true));
    assert!(list.set_checked("Delta.esp", true));
    assert!(!list.set_checked("Skyrim.esm", true));

    assert_eq!(list.checked_names(), vec!["Delta.esp", "Bravo.esp"]);
    assert_eq!(list.checked_count(), 2);

    list.select_all();
    assert_eq!(list.checked_count(), 4);
    list.select_none();
    assert!(list.checked_names().is_empty());
}

#[test]
fn test_toggle_out_of_range() {
    let mut list = SelectionList::default();
    assert_eq!(list.toggle(0), None);
}
