//! One cleaning session: settings, game profile and plugin snapshot resolved
//! together, ready for the picker or a headless run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::batch::{self, BatchEvent, BatchOptions, CancellationToken, CleanResult};
use crate::launcher::{DryRunLauncher, ProcessLauncher, SystemLauncher};
use crate::plugins::{PluginSnapshot, PriorityIndex};
use crate::profiles::{GameProfile, ProfileRegistry};
use crate::selection::{SelectionFlags, SelectionList};
use crate::settings::CleanerSettings;
use crate::types::GameId;

/// Where the plugin list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    /// JSON snapshot file
    Snapshot(PathBuf),
    /// Mod manager profile directory with `plugins.txt`
    ProfileDir(PathBuf),
}

/// Resolved inputs for selection and cleaning
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: CleanerSettings,
    pub profile: GameProfile,
    pub snapshot: PluginSnapshot,
    cc_pattern: Regex,
    priorities: PriorityIndex,
}

impl Session {
    /// Validate settings, load profiles and the plugin list.
    ///
    /// The game is taken from `game`, then the snapshot, then the settings.
    pub fn open(
        settings: CleanerSettings,
        source: &PluginSource,
        game: Option<GameId>,
    ) -> Result<Self> {
        settings.validate().context("Invalid settings")?;

        let registry = match &settings.profiles_file {
            Some(path) => ProfileRegistry::with_overrides(path)?,
            None => ProfileRegistry::builtin(),
        };

        let (snapshot, game) = match source {
            PluginSource::Snapshot(path) => {
                let snapshot = PluginSnapshot::load_from_file(path)?;
                let game = game
                    .or(snapshot.game)
                    .or(settings.game)
                    .context("No game given: pass --game, or set \"game\" in the snapshot or settings")?;
                (snapshot, game)
            }
            PluginSource::ProfileDir(dir) => {
                let game = game
                    .or(settings.game)
                    .context("No game given: pass --game or set \"game\" in settings")?;
                let profile = registry.get(game)?;
                (PluginSnapshot::load_from_profile_dir(dir, profile)?, game)
            }
        };

        let profile = registry.get(game)?.clone();
        let cc_pattern = profile.cc_regex()?;
        let priorities = snapshot.priorities();
        info!(
            "Session opened for {} with {} plugin(s)",
            profile.display_name,
            snapshot.len()
        );

        Ok(Self {
            settings,
            profile,
            snapshot,
            cc_pattern,
            priorities,
        })
    }

    pub fn flags(&self) -> SelectionFlags {
        self.settings.selection_flags()
    }

    /// Default checklist for the picker.
    pub fn selection(&self) -> SelectionList {
        SelectionList::new(
            &self.snapshot.plugins,
            &self.profile,
            &self.cc_pattern,
            &self.flags(),
        )
    }

    pub fn options(&self) -> BatchOptions {
        self.settings.batch_options(&self.profile)
    }

    pub fn priority_of(&self, name: &str) -> i32 {
        self.priorities.priority_of(name)
    }

    /// Launcher for this session's settings.
    pub fn launcher(&self, dry_run: bool) -> Box<dyn ProcessLauncher + Send> {
        if dry_run {
            debug!("Using dry-run launcher");
            Box::new(DryRunLauncher::new())
        } else {
            Box::new(SystemLauncher::new(
                self.settings.executables.clone(),
                self.settings.launch_wrapper.clone(),
            ))
        }
    }

    /// Clean `selected` with `launcher`.
    pub fn run<L, O>(
        &self,
        selected: &[String],
        launcher: &mut L,
        token: &CancellationToken,
        observer: O,
    ) -> CleanResult
    where
        L: ProcessLauncher + ?Sized,
        O: FnMut(&BatchEvent),
    {
        batch::run(
            selected,
            |name| self.priority_of(name),
            &self.profile,
            &self.options(),
            launcher,
            token,
            observer,
        )
    }
}
