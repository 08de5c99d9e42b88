//! Sequential batch cleaning.
//!
//! Plugins are cleaned one at a time, highest priority first. Each cleaner
//! process is waited on before the next one starts.
//!
//! # Failure Modes
//!
//! | Situation | Effect |
//! |-----------|--------|
//! | cleaner exits non-zero | plugin recorded in `failed_names`, batch continues |
//! | cleaner cannot be started | `launch_failure` set, batch stops |
//! | process cannot be waited on | batch cancelled, plugin not counted |
//! | token cancelled | batch stops before the next plugin |

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::cleaner_args::{CleanerArgs, GameSwitch, ToolArgs};
use crate::launcher::{ProcessLauncher, WaitOutcome};
use crate::profiles::GameProfile;

/// Cooperative cancellation flag shared between the batch and whoever may
/// want to stop it (UI thread, signal handler).
///
/// Only observed between plugins: a running cleaner is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.cancelled.swap(false, Ordering::SeqCst)
    }
}

/// How the cleaner is invoked for every plugin of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Launch `xEdit` instead of the game-specific executable
    pub use_generic_exe_name: bool,
    /// Absolute data directory for `-D:`
    pub data_path: Option<String>,
    /// `<documents dir>/<ini>` for `-I:`
    pub ini_path: Option<String>,
    /// Legacy free-form game switch, without the dash
    pub game_arg: Option<String>,
}

impl BatchOptions {
    /// Arguments for cleaning `plugin` under `profile`.
    pub fn cleaner_args(&self, profile: &GameProfile, plugin: &str) -> CleanerArgs {
        CleanerArgs {
            executable: profile.executable(self.use_generic_exe_name).to_string(),
            plugin: plugin.to_string(),
            data_path: self.data_path.clone(),
            ini_path: self.ini_path.clone(),
            game_switch: GameSwitch::resolve(&profile.game_switch, self.game_arg.as_deref()),
        }
    }
}

/// Outcome of one plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Cleaned,
    Failed { exit_code: i32 },
    /// The process could not be tracked to completion; batch stops.
    Untracked,
}

/// Progress notifications emitted while a batch runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// About to launch the cleaner for `name` (`index` is 0-based).
    Starting {
        name: String,
        index: usize,
        total: usize,
    },
    Finished { name: String, outcome: ItemOutcome },
    /// The cleaner executable could not be started.
    LaunchFailed { executable: String },
    Cancelled,
}

/// Aggregated result of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanResult {
    pub succeeded_count: usize,
    /// Failed plugins in invocation order
    pub failed_names: Vec<String>,
    pub canceled: bool,
    /// Executable that could not be started, if the batch aborted on launch
    pub launch_failure: Option<String>,
}

impl CleanResult {
    /// Every processed plugin cleaned and nothing stopped the batch.
    pub fn is_clean(&self) -> bool {
        self.failed_names.is_empty() && self.launch_failure.is_none() && !self.canceled
    }
}

/// Order `selected` for cleaning: descending priority, ties keep input order.
/// Duplicate names are cleaned once.
pub fn invocation_order<F>(selected: &[String], priority_of: F) -> Vec<String>
where
    F: Fn(&str) -> i32,
{
    let mut seen = HashSet::new();
    let mut ordered: Vec<(i32, &String)> = selected
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| (priority_of(name), name))
        .collect();
    ordered.sort_by(|a, b| b.0.cmp(&a.0));
    ordered.into_iter().map(|(_, name)| name.clone()).collect()
}

/// Clean `selected` plugins one after another.
///
/// The token is checked before each plugin. When found set it is cleared
/// and the result marked `canceled`. An untrackable process sets the token
/// itself, so the batch ends at the next check without counting that plugin.
/// The token is always left cleared on return.
pub fn run<L, F, O>(
    selected: &[String],
    priority_of: F,
    profile: &GameProfile,
    options: &BatchOptions,
    launcher: &mut L,
    token: &CancellationToken,
    mut observer: O,
) -> CleanResult
where
    L: ProcessLauncher + ?Sized,
    F: Fn(&str) -> i32,
    O: FnMut(&BatchEvent),
{
    let order = invocation_order(selected, priority_of);
    let total = order.len();
    let mut result = CleanResult::default();
    let mut lost_track = false;

    info!(
        "Cleaning {} plugin(s) with {}",
        total,
        profile.executable(options.use_generic_exe_name)
    );

    for (index, plugin) in order.iter().enumerate() {
        if token.take() {
            info!("Batch cancelled, {} plugin(s) not processed", total - index);
            result.canceled = true;
            observer(&BatchEvent::Cancelled);
            break;
        }

        let args = options.cleaner_args(profile, plugin);
        let executable = args.executable().to_string();
        let cli_args = args.to_cli_args();

        observer(&BatchEvent::Starting {
            name: plugin.clone(),
            index,
            total,
        });
        debug!("Launching {} {:?}", executable, cli_args);

        let Some(handle) = launcher.start(&executable, &cli_args) else {
            error!("Failed to start {}; is it registered?", executable);
            observer(&BatchEvent::LaunchFailed {
                executable: executable.clone(),
            });
            result.launch_failure = Some(executable);
            break;
        };

        let outcome = match launcher.wait(handle) {
            WaitOutcome::Untracked => {
                warn!("Lost track of the cleaner for {}, stopping batch", plugin);
                token.cancel();
                lost_track = true;
                ItemOutcome::Untracked
            }
            WaitOutcome::Exited(0) => {
                info!("Cleaned {}", plugin);
                result.succeeded_count += 1;
                ItemOutcome::Cleaned
            }
            WaitOutcome::Exited(code) => {
                warn!("Cleaning {} failed with exit code {}", plugin, code);
                result.failed_names.push(plugin.clone());
                ItemOutcome::Failed { exit_code: code }
            }
        };

        observer(&BatchEvent::Finished {
            name: plugin.clone(),
            outcome,
        });
    }

    // A late cancel with nothing left to skip is not a cancellation, but an
    // untracked final plugin still is
    if token.take() && lost_track && !result.canceled {
        result.canceled = true;
        observer(&BatchEvent::Cancelled);
    }

    info!(
        "Batch finished: {} cleaned, {} failed{}",
        result.succeeded_count,
        result.failed_names.len(),
        if result.canceled { ", cancelled" } else { "" }
    );
    result
}
