//! Settings file handling.
//!
//! Settings are read once at the start of a run. Every key is optional in the
//! file; missing keys take the defaults below, so an empty `{}` is a valid
//! settings file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch::BatchOptions;
use crate::error::CleanerError;
use crate::profiles::GameProfile;
use crate::selection::SelectionFlags;
use crate::types::{GameId, SortOrder};

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Persisted cleaner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerSettings {
    // Default selection policy
    /// Check Creation Club plugins by default
    pub clean_cc: bool,
    /// Check base game / DLC plugins by default
    pub clean_beth: bool,
    /// Check all other (mod) plugins by default
    pub clean_else: bool,
    /// Order the checklist by priority instead of alphabetically
    pub sort_by_priority: bool,

    // Cleaner invocation
    /// Pass `-D:"<data dir>"` to xEdit
    pub explicit_data_path: bool,
    /// Pass `-I:"<documents dir>/<ini>"` to xEdit
    pub explicit_ini_path: bool,
    /// Free-form game switch without the dash (sse, tes5vr, fo4vr, ...)
    pub explicit_game_arg: String,
    /// Launch as `xEdit` instead of the game-specific executable name
    pub exe_name_xedit: bool,

    // Game location
    pub game: Option<GameId>,
    pub data_directory: Option<PathBuf>,
    pub documents_directory: Option<PathBuf>,

    // Tool registry
    /// Registered executables: name -> path
    pub executables: BTreeMap<String, PathBuf>,
    /// Command prefix for launching the cleaner (e.g. `["wine"]`)
    pub launch_wrapper: Vec<String>,
    /// JSON file with extra or replacement game profiles
    pub profiles_file: Option<PathBuf>,
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            clean_cc: true,
            clean_beth: false,
            clean_else: true,
            sort_by_priority: true,
            explicit_data_path: false,
            explicit_ini_path: false,
            explicit_game_arg: String::new(),
            exe_name_xedit: false,
            game: None,
            data_directory: None,
            documents_directory: None,
            executables: BTreeMap::new(),
            launch_wrapper: Vec::new(),
            profiles_file: None,
        }
    }
}

impl CleanerSettings {
    /// Platform default: `<config dir>/plugin-cleaner/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "plugin-cleaner")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        Ok(settings)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            debug!("No settings at {:?}, using defaults", path.as_ref());
            Ok(Self::default())
        }
    }

    /// Save settings to a JSON file, creating parent directories.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.explicit_data_path && self.data_directory.is_none() {
            return Err(CleanerError::config(
                "explicit_data_path is enabled but data_directory is not set",
            ));
        }

        if self.explicit_ini_path && self.documents_directory.is_none() {
            return Err(CleanerError::config(
                "explicit_ini_path is enabled but documents_directory is not set",
            ));
        }

        let game_arg = self.explicit_game_arg.trim();
        if game_arg.starts_with('-') {
            return Err(CleanerError::config(
                "explicit_game_arg must be given without the leading dash",
            ));
        }
        if game_arg.contains(char::is_whitespace) {
            return Err(CleanerError::config(
                "explicit_game_arg cannot contain whitespace",
            ));
        }

        if self.launch_wrapper.iter().any(|part| part.trim().is_empty()) {
            return Err(CleanerError::config(
                "launch_wrapper cannot contain empty entries",
            ));
        }

        Ok(())
    }

    /// Default-selection policy
    pub fn selection_flags(&self) -> SelectionFlags {
        SelectionFlags {
            clean_cc: self.clean_cc,
            clean_beth: self.clean_beth,
            clean_else: self.clean_else,
            sort_order: if self.sort_by_priority {
                SortOrder::Priority
            } else {
                SortOrder::Name
            },
        }
    }

    /// Invocation options for a batch run against `profile`.
    ///
    /// Call `validate()` first; explicit paths whose directory is unset are
    /// left out here.
    pub fn batch_options(&self, profile: &GameProfile) -> BatchOptions {
        let data_path = if self.explicit_data_path {
            self.data_directory.as_deref().map(absolute_path)
        } else {
            None
        };

        let ini_path = match (self.explicit_ini_path, &self.documents_directory) {
            (true, Some(docs)) => profile
                .primary_ini()
                .map(|ini| format!("{}/{}", docs.display(), ini)),
            _ => None,
        };

        let game_arg = Some(self.explicit_game_arg.trim())
            .filter(|arg| !arg.is_empty())
            .map(str::to_string);

        BatchOptions {
            use_generic_exe_name: self.exe_name_xedit,
            data_path,
            ini_path,
            game_arg,
        }
    }
}

fn absolute_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
