//! Application state definitions
//!
//! Contains the picker state, its modes, and the key handling that drives
//! mode transitions. Key handling is pure: it mutates `AppState` and returns
//! an `AppAction` for the event loop to carry out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::batch::{BatchEvent, CleanResult, ItemOutcome};
use crate::report::RunReport;
use crate::selection::SelectionList;

/// Application operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Checklist is editable
    Selecting,
    /// A batch is running
    Cleaning,
    /// Batch finished, showing the summary
    Done,
}

/// Side effects requested by key handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Quit,
    /// Start cleaning these plugins
    StartCleaning(Vec<String>),
    /// Stop after the running plugin
    Cancel,
}

/// Progress of the running batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub current: Option<String>,
    /// Plugins finished so far
    pub done: usize,
    pub total: usize,
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub mode: AppMode,
    pub selection: SelectionList,
    /// Highlighted row
    pub cursor: usize,
    /// Header line, e.g. "Fallout 4 - FO4Edit"
    pub title: String,
    /// Status message for user feedback
    pub status_message: String,
    pub progress: Option<Progress>,
    /// Per-plugin results as they come in
    pub log: Vec<String>,
    pub report: Option<RunReport>,
    /// Quit once the running batch has stopped
    pub quit_requested: bool,
    /// Whether help overlay is visible
    pub help_visible: bool,
}

impl AppState {
    pub fn new(selection: SelectionList, title: impl Into<String>) -> Self {
        let status_message = format!(
            "{} of {} plugin(s) selected",
            selection.checked_count(),
            selection.len()
        );
        Self {
            mode: AppMode::Selecting,
            selection,
            cursor: 0,
            title: title.into(),
            status_message,
            progress: None,
            log: Vec::new(),
            report: None,
            quit_requested: false,
            help_visible: false,
        }
    }

    fn refresh_status(&mut self) {
        self.status_message = format!(
            "{} of {} plugin(s) selected, sorted by {}",
            self.selection.checked_count(),
            self.selection.len(),
            self.selection.sort_order()
        );
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');

        if self.help_visible {
            self.help_visible = false;
            return AppAction::None;
        }

        match self.mode {
            AppMode::Selecting => {
                if ctrl_c {
                    return AppAction::Quit;
                }
                self.handle_selecting_key(key.code)
            }
            AppMode::Cleaning => {
                let quit = ctrl_c || key.code == KeyCode::Char('q');
                if !quit && key.code != KeyCode::Esc {
                    return AppAction::None;
                }
                self.quit_requested |= quit;
                self.status_message =
                    "Cancelling: the running cleaner will finish first".to_string();
                AppAction::Cancel
            }
            AppMode::Done => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => AppAction::Quit,
                _ if ctrl_c => AppAction::Quit,
                _ => AppAction::None,
            },
        }
    }

    fn handle_selecting_key(&mut self, code: KeyCode) -> AppAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor = self.selection.len().saturating_sub(1)
            }
            KeyCode::Char(' ') => {
                self.selection.toggle(self.cursor);
            }
            KeyCode::Char('a') => self.selection.select_all(),
            KeyCode::Char('n') => self.selection.select_none(),
            KeyCode::Char('s') => {
                // Keep the cursor on the same plugin across the re-sort
                let name = self
                    .selection
                    .entries()
                    .get(self.cursor)
                    .map(|entry| entry.name.clone());
                let order = self.selection.sort_order().toggled();
                self.selection.sort(order);
                if let Some(name) = name {
                    self.cursor = self
                        .selection
                        .entries()
                        .iter()
                        .position(|entry| entry.name == name)
                        .unwrap_or(0);
                }
            }
            KeyCode::Char('?') => self.help_visible = true,
            KeyCode::Enter | KeyCode::Char('c') => {
                let names = self.selection.checked_names();
                if names.is_empty() {
                    self.status_message = "Nothing selected".to_string();
                    return AppAction::None;
                }
                self.mode = AppMode::Cleaning;
                self.progress = Some(Progress {
                    current: None,
                    done: 0,
                    total: names.len(),
                });
                self.status_message = format!("Cleaning {} plugin(s)...", names.len());
                return AppAction::StartCleaning(names);
            }
            _ => return AppAction::None,
        }
        self.refresh_status();
        AppAction::None
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.selection.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.selection.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Apply a progress event from the batch worker
    pub fn apply_event(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::Starting { name, index, total } => {
                self.progress = Some(Progress {
                    current: Some(name.clone()),
                    done: *index,
                    total: *total,
                });
                self.status_message = format!("Cleaning {} ({}/{})", name, index + 1, total);
            }
            BatchEvent::Finished { name, outcome } => {
                if let Some(progress) = &mut self.progress {
                    progress.done += 1;
                    progress.current = None;
                }
                let line = match outcome {
                    ItemOutcome::Cleaned => format!("✓ {}", name),
                    ItemOutcome::Failed { exit_code } => {
                        format!("✗ {} (exit code {})", name, exit_code)
                    }
                    ItemOutcome::Untracked => format!("? {} (lost track of cleaner)", name),
                };
                self.log.push(line);
            }
            BatchEvent::LaunchFailed { executable } => {
                self.log.push(format!("✗ Failed to start {}", executable));
            }
            BatchEvent::Cancelled => self.log.push("Cancelled".to_string()),
        }
    }

    /// Batch is over: show the report
    pub fn finish(&mut self, result: &CleanResult) {
        let report = RunReport::from(result);
        self.status_message = report.summary.title().to_string();
        self.report = Some(report);
        self.progress = None;
        self.mode = AppMode::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionEntry;
    use crate::types::SortOrder;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        let entries = vec![
            SelectionEntry {
                name: "Zeta.esp".to_string(),
                priority: 1,
                checked: true,
            },
            SelectionEntry {
                name: "Alpha.esp".to_string(),
                priority: 2,
                checked: false,
            },
        ];
        AppState::new(
            SelectionList::from_entries(entries, SortOrder::Priority),
            "Test",
        )
    }

    #[test]
    fn test_sort_toggle_keeps_cursor_on_plugin() {
        let mut state = state();
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.selection.entries()[state.cursor].name, "Alpha.esp");

        state.handle_key(key(KeyCode::Char('s')));
        assert_eq!(state.selection.sort_order(), SortOrder::Name);
        assert_eq!(state.cursor, 0);
        assert_eq!(state.selection.entries()[state.cursor].name, "Alpha.esp");
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut state = state();
        state.handle_key(key(KeyCode::Up));
        assert_eq!(state.cursor, 0);
        state.handle_key(key(KeyCode::PageDown));
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn test_ctrl_c_while_cleaning_cancels_and_quits() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.mode, AppMode::Cleaning);

        let action = state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, AppAction::Cancel);
        assert!(state.quit_requested);
    }

    #[test]
    fn test_esc_while_cleaning_cancels_without_quitting() {
        let mut state = state();
        assert_eq!(
            state.handle_key(key(KeyCode::Char('c'))),
            AppAction::StartCleaning(vec!["Zeta.esp".to_string()])
        );
        assert_eq!(state.handle_key(key(KeyCode::Char('c'))), AppAction::None);
        assert_eq!(state.handle_key(key(KeyCode::Esc)), AppAction::Cancel);
        assert!(!state.quit_requested);
    }

    #[test]
    fn test_help_overlay_swallows_next_key() {
        let mut state = state();
        state.handle_key(key(KeyCode::Char('?')));
        assert!(state.help_visible);
        assert_eq!(state.handle_key(key(KeyCode::Char('q'))), AppAction::None);
        assert!(!state.help_visible);
    }
}
