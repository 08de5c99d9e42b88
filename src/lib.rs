//! Plugin Cleaner Library
//!
//! Builds a checklist of a game's plugins, pre-checked by category, and
//! quick-auto-cleans the chosen ones with xEdit, one process per plugin in
//! descending load-order priority.

pub mod app;
pub mod batch;
pub mod cleaner_args;
pub mod cli;
pub mod error;
pub mod launcher;
pub mod plugins;
pub mod process_guard;
pub mod profiles;
pub mod report;
pub mod selection;
pub mod session;
pub mod settings;
pub mod theme;
pub mod types;
pub mod ui;

// Re-export main types for convenience
pub use batch::{
    BatchEvent, BatchOptions, CancellationToken, CleanResult, ItemOutcome, invocation_order,
};
pub use cleaner_args::{BASE_FLAGS, CleanerArgs, GameSwitch, ToolArgs};
pub use error::{CleanerError, Result};
pub use launcher::{DryRunLauncher, ProcessHandle, ProcessLauncher, SystemLauncher, WaitOutcome};
pub use plugins::{PluginRecord, PluginSnapshot, PriorityIndex, UNKNOWN_PRIORITY};
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use profiles::{GameProfile, ProfileRegistry};
pub use report::{LaunchError, RunReport, Summary};
pub use selection::{SelectionEntry, SelectionFlags, SelectionList};
pub use session::{PluginSource, Session};
pub use settings::CleanerSettings;
pub use types::{GameId, SortOrder};
