//! Default checklist state for the plugin picker.
//!
//! `build` turns the host's plugin list into checklist entries: main masters
//! are dropped, active plugins are pre-checked according to the policy flags,
//! and the list is ordered by priority or name. `SelectionList` is the
//! mutable view the picker edits afterwards.

use regex::Regex;

use crate::plugins::PluginRecord;
use crate::profiles::GameProfile;
use crate::types::SortOrder;

/// Policy flags for the default checked state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionFlags {
    /// Pre-check active Creation Club plugins
    pub clean_cc: bool,
    /// Pre-check active official (base game / DLC) plugins
    pub clean_beth: bool,
    /// Pre-check every other active plugin
    pub clean_else: bool,
    pub sort_order: SortOrder,
}

impl Default for SelectionFlags {
    fn default() -> Self {
        Self {
            clean_cc: true,
            clean_beth: false,
            clean_else: true,
            sort_order: SortOrder::Priority,
        }
    }
}

/// One checklist row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub name: String,
    pub priority: i32,
    pub checked: bool,
}

/// Whether `plugin` starts out checked.
///
/// Inactive plugins are never pre-checked. CC and official content are
/// independent classifications: if a name were both, either policy checks it.
pub fn default_checked(
    plugin: &PluginRecord,
    profile: &GameProfile,
    cc_pattern: &Regex,
    flags: &SelectionFlags,
) -> bool {
    if !plugin.active {
        return false;
    }

    let is_cc = cc_pattern
        .find(&plugin.name)
        .is_some_and(|m| m.start() == 0);
    let is_beth = profile.is_official_content(&plugin.name);

    (is_cc && flags.clean_cc)
        || (is_beth && flags.clean_beth)
        || (!is_cc && !is_beth && flags.clean_else)
}

/// Build the initial checklist.
pub fn build(
    plugins: &[PluginRecord],
    profile: &GameProfile,
    cc_pattern: &Regex,
    flags: &SelectionFlags,
) -> Vec<SelectionEntry> {
    let mut entries: Vec<SelectionEntry> = plugins
        .iter()
        .filter(|plugin| !profile.is_main_master(&plugin.name))
        .map(|plugin| SelectionEntry {
            name: plugin.name.clone(),
            priority: plugin.priority,
            checked: default_checked(plugin, profile, cc_pattern, flags),
        })
        .collect();

    sort_entries(&mut entries, flags.sort_order);
    entries
}

fn sort_entries(entries: &mut [SelectionEntry], order: SortOrder) {
    match order {
        SortOrder::Priority => entries.sort_by_key(|entry| entry.priority),
        SortOrder::Name => entries.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

/// Mutable checklist backing the picker
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    entries: Vec<SelectionEntry>,
    sort_order: SortOrder,
}

impl SelectionList {
    /// Build the default checklist and keep it for editing.
    pub fn new(
        plugins: &[PluginRecord],
        profile: &GameProfile,
        cc_pattern: &Regex,
        flags: &SelectionFlags,
    ) -> Self {
        Self {
            entries: build(plugins, profile, cc_pattern, flags),
            sort_order: flags.sort_order,
        }
    }

    pub fn from_entries(mut entries: Vec<SelectionEntry>, sort_order: SortOrder) -> Self {
        sort_entries(&mut entries, sort_order);
        Self {
            entries,
            sort_order,
        }
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Flip the checkbox at `index`. Returns the new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let entry = self.entries.get_mut(index)?;
        entry.checked = !entry.checked;
        Some(entry.checked)
    }

    /// Set the checkbox for `name`. Returns false if no such row.
    pub fn set_checked(&mut self, name: &str, checked: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.entries.iter_mut().for_each(|entry| entry.checked = true);
    }

    pub fn select_none(&mut self) {
        self.entries.iter_mut().for_each(|entry| entry.checked = false);
    }

    pub fn sort(&mut self, order: SortOrder) {
        self.sort_order = order;
        sort_entries(&mut self.entries, order);
    }

    /// Checked plugin names in display order.
    pub fn checked_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.checked)
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn checked_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.checked).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameId;

    fn fixture() -> (GameProfile, Regex) {
        let profile = GameProfile::builtin(GameId::Fo4);
        let regex = profile.cc_regex().expect("pattern compiles");
        (profile, regex)
    }

    #[test]
    fn test_inactive_plugins_start_unchecked() {
        let (profile, regex) = fixture();
        let plugin = PluginRecord::new("SomeMod.esp", 10, false);
        let flags = SelectionFlags::default();
        assert!(!default_checked(&plugin, &profile, &regex, &flags));
    }

    #[test]
    fn test_official_content_follows_clean_beth() {
        let (profile, regex) = fixture();
        let plugin = PluginRecord::new("DLCCoast.esm", 3, true);

        let mut flags = SelectionFlags::default();
        assert!(!default_checked(&plugin, &profile, &regex, &flags));

        flags.clean_beth = true;
        flags.clean_else = false;
        assert!(default_checked(&plugin, &profile, &regex, &flags));
    }

    #[test]
    fn test_cc_plugins_are_not_governed_by_clean_else() {
        let (profile, regex) = fixture();
        let plugin = PluginRecord::new("ccBGSFO4001-PipBoy(Black).esl", 20, true);
        let flags = SelectionFlags {
            clean_cc: false,
            clean_beth: false,
            clean_else: true,
            sort_order: SortOrder::Priority,
        };
        assert!(!default_checked(&plugin, &profile, &regex, &flags));
    }

    #[test]
    fn test_empty_input() {
        let (profile, regex) = fixture();
        assert!(build(&[], &profile, &regex, &SelectionFlags::default()).is_empty());
    }

    #[test]
    fn test_list_bulk_operations() {
        let (profile, regex) = fixture();
        let plugins = vec![
            PluginRecord::new("Fallout4.esm", 0, true),
            PluginRecord::new("B.esp", 2, true),
            PluginRecord::new("A.esp", 1, false),
        ];
        let mut list = SelectionList::new(&plugins, &profile, &regex, &SelectionFlags::default());
        assert_eq!(list.len(), 2);
        assert_eq!(list.checked_names(), vec!["B.esp".to_string()]);

        list.select_all();
        assert_eq!(list.checked_count(), 2);
        list.select_none();
        assert_eq!(list.checked_count(), 0);

        assert_eq!(list.toggle(0), Some(true));
        assert_eq!(list.checked_names(), vec!["A.esp".to_string()]);
        assert_eq!(list.toggle(5), None);

        assert!(list.set_checked("B.esp", true));
        assert!(!list.set_checked("Fallout4.esm", true));
    }
}
