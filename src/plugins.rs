//! Read-only snapshot of the plugin list known to the mod manager.
//!
//! Two sources are supported:
//! - a JSON snapshot (`{"game": "fo4", "plugins": [{"name", "priority", "active"}]}`),
//!   suitable for exporting from any mod manager;
//! - a mod manager profile directory holding `plugins.txt` (and optionally
//!   `loadorder.txt`), the format shared by Mod Organizer 2 and the games.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CleanerError;
use crate::profiles::GameProfile;
use crate::types::GameId;

/// Priority reported for a name that is not in the snapshot.
pub const UNKNOWN_PRIORITY: i32 = -1;

/// One plugin as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: String,
    /// Load-order rank; higher loads later.
    pub priority: i32,
    pub active: bool,
}

impl PluginRecord {
    pub fn new(name: impl Into<String>, priority: i32, active: bool) -> Self {
        Self {
            name: name.into(),
            priority,
            active,
        }
    }
}

/// Plugin list plus, when the source knows it, the managed game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameId>,
    pub plugins: Vec<PluginRecord>,
}

impl PluginSnapshot {
    pub fn new(game: Option<GameId>, plugins: Vec<PluginRecord>) -> Self {
        Self { game, plugins }
    }

    /// Load a JSON snapshot file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read plugin list from {:?}", path.as_ref()))?;
        let snapshot: Self =
            serde_json::from_str(&content).context("Failed to parse plugin list JSON")?;
        snapshot.validate()?;
        info!(
            "Loaded {} plugin(s) from {:?}",
            snapshot.plugins.len(),
            path.as_ref()
        );
        Ok(snapshot)
    }

    /// Every plugin needs a name, and a name may appear only once.
    pub fn validate(&self) -> crate::error::Result<()> {
        let mut seen = HashMap::new();
        for (index, plugin) in self.plugins.iter().enumerate() {
            if plugin.name.trim().is_empty() {
                return Err(CleanerError::snapshot(format!(
                    "plugin #{} has an empty name",
                    index
                )));
            }
            if let Some(first) = seen.insert(plugin.name.as_str(), index) {
                return Err(CleanerError::snapshot(format!(
                    "{} is listed twice (entries #{} and #{})",
                    plugin.name, first, index
                )));
            }
        }
        Ok(())
    }

    /// Save as a JSON snapshot file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize plugin list")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write plugin list to {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Read `plugins.txt` (+ optional `loadorder.txt`) from a profile directory.
    ///
    /// Priority is the index in `loadorder.txt` when present, otherwise the
    /// index in `plugins.txt`. Plugins only listed in `loadorder.txt` are
    /// treated as active when the game loads them implicitly (main masters
    /// and official content).
    pub fn load_from_profile_dir<P: AsRef<Path>>(
        dir: P,
        profile: &GameProfile,
    ) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let plugins_txt = dir.join("plugins.txt");
        let content = read_list_file(&plugins_txt)?;
        let listed = parse_plugins_txt(&content);

        let load_order_txt = dir.join("loadorder.txt");
        let plugins = if load_order_txt.exists() {
            let order = read_list_file(&load_order_txt)?;
            merge_load_order(&listed, &parse_load_order_txt(&order), profile)
        } else {
            debug!("No loadorder.txt in {:?}, using plugins.txt order", dir);
            listed
                .iter()
                .enumerate()
                .map(|(index, (name, active))| {
                    PluginRecord::new(name.clone(), index as i32, *active)
                })
                .collect()
        };

        info!("Loaded {} plugin(s) from profile {:?}", plugins.len(), dir);
        Ok(Self {
            game: Some(profile.id),
            plugins,
        })
    }

    /// Priority lookup keyed by plugin name.
    pub fn priorities(&self) -> PriorityIndex {
        PriorityIndex {
            by_name: self
                .plugins
                .iter()
                .map(|p| (p.name.clone(), p.priority))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Name -> priority map taken from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct PriorityIndex {
    by_name: HashMap<String, i32>,
}

impl PriorityIndex {
    /// Priority of `name`, or `UNKNOWN_PRIORITY` if the host does not know it.
    pub fn priority_of(&self, name: &str) -> i32 {
        self.by_name.get(name).copied().unwrap_or(UNKNOWN_PRIORITY)
    }
}

/// Read a plugin list file as text.
///
/// A leading UTF-8 byte order mark is dropped. Files written in a legacy
/// code page still load: undecodable bytes become U+FFFD and a warning
/// names the file.
fn read_list_file(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "{:?} is not valid UTF-8 ({}), non-ASCII plugin names may not match",
                path,
                e.utf8_error()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// Parse `plugins.txt`: `*Name.esp` is active, `Name.esp` inactive.
fn parse_plugins_txt(content: &str) -> Vec<(String, bool)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.strip_prefix('*') {
            Some(name) => (name.trim().to_string(), true),
            None => (line.to_string(), false),
        })
        .collect()
}

fn parse_load_order_txt(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn merge_load_order(
    listed: &[(String, bool)],
    order: &[String],
    profile: &GameProfile,
) -> Vec<PluginRecord> {
    let states: HashMap<&str, bool> = listed
        .iter()
        .map(|(name, active)| (name.as_str(), *active))
        .collect();

    let mut records: Vec<PluginRecord> = order
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let active = states.get(name.as_str()).copied().unwrap_or_else(|| {
                profile.is_main_master(name) || profile.is_official_content(name)
            });
            PluginRecord::new(name.clone(), index as i32, active)
        })
        .collect();

    // plugins.txt entries missing from loadorder.txt go after everything else
    let mut next = records.len() as i32;
    for (name, active) in listed {
        if !order.iter().any(|o| o == name) {
            warn!("{} is in plugins.txt but not loadorder.txt", name);
            records.push(PluginRecord::new(name.clone(), next, *active));
            next += 1;
        }
    }
    records
}
