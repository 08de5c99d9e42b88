//! Per-game reference data for the cleaner.
//!
//! Each supported game has a `GameProfile` naming the xEdit executable,
//! its game switch, the main master (never cleaned), the official
//! DLC/base-game plugins and the ini files xEdit may need pointing at.
//!
//! The built-in table is kept in Rust for compile-time checks, and can be
//! extended or overridden at runtime from a JSON file so a new DLC does not
//! require a rebuild.
//!
//! # Supported Profiles
//!
//! | Game    | Cleaner     | Main master    |
//! |---------|-------------|----------------|
//! | tes4    | TES4Edit    | Oblivion.esm   |
//! | tes5    | TES5Edit    | Skyrim.esm     |
//! | sse     | SSEEdit     | Skyrim.esm     |
//! | tes5vr  | TES5VREdit  | Skyrim.esm     |
//! | enderal | EnderalEdit | Skyrim.esm     |
//! | fo3     | FO3Edit     | Fallout3.esm   |
//! | fnv     | FNVEdit     | FalloutNV.esm  |
//! | fo4     | FO4Edit     | Fallout4.esm   |
//! | fo4vr   | FO4VREdit   | Fallout4.esm   |
//! | fo76    | FO76Edit    | SeventySix.esm |

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::error::{CleanerError, Result};
use crate::types::GameId;

/// Creation Club plugin names: `cc` + 6 word chars + 3 digits + `-`.
pub const DEFAULT_CC_PATTERN: &str = r"cc\w{6}[0-9]{3}-";

/// Executable name used when the user registered xEdit under its generic name.
pub const GENERIC_CLEANER_EXECUTABLE: &str = "xEdit";

fn default_cc_pattern() -> String {
    DEFAULT_CC_PATTERN.to_string()
}

/// Static description of one game as far as cleaning is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: GameId,
    pub display_name: String,
    /// Game-specific xEdit executable name (e.g. `FO4Edit`).
    pub cleaner_executable: String,
    /// Switch selecting the game mode in a generic xEdit (e.g. `-fo4`).
    pub game_switch: String,
    /// Base game masters; never offered for cleaning.
    pub main_masters: BTreeSet<String>,
    /// Base-game and DLC plugins, governed by the `clean_beth` policy.
    #[serde(default)]
    pub official_content: BTreeSet<String>,
    /// Game ini files, first one is passed with `-I:`.
    #[serde(default)]
    pub ini_files: Vec<String>,
    #[serde(default = "default_cc_pattern")]
    pub cc_pattern: String,
}

impl GameProfile {
    /// Whether `name` is one of this game's main masters.
    pub fn is_main_master(&self, name: &str) -> bool {
        self.main_masters.contains(name)
    }

    /// Whether `name` is official base-game or DLC content.
    pub fn is_official_content(&self, name: &str) -> bool {
        self.official_content.contains(name)
    }

    /// Compile the CC pattern, anchored at the start of the plugin name.
    pub fn cc_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&format!("^(?:{})", self.cc_pattern))?)
    }

    /// First ini file, used for the explicit `-I:` argument.
    pub fn primary_ini(&self) -> Option<&str> {
        self.ini_files.first().map(String::as_str)
    }

    /// Resolve the executable to launch.
    pub fn executable(&self, use_generic_name: bool) -> &str {
        if use_generic_name {
            GENERIC_CLEANER_EXECUTABLE
        } else {
            &self.cleaner_executable
        }
    }

    /// One row of the `games` listing: id, name, executable and switch.
    pub fn summary_row(&self, use_generic_name: bool) -> String {
        format!(
            "{:<8} {:<28} {:<12} {}",
            self.id.as_str(),
            self.display_name,
            self.executable(use_generic_name),
            self.game_switch
        )
    }

    /// Built-in profile for `game`.
    pub fn builtin(game: GameId) -> Self {
        let (display_name, exe, masters, official, inis): (
            &str,
            &str,
            &[&str],
            &[&str],
            &[&str],
        ) = match game {
            GameId::Tes4 => (
                "Oblivion",
                "TES4Edit",
                &["Oblivion.esm"],
                &[
                    "DLCShiveringIsles.esp",
                    "Knights.esp",
                    "DLCBattlehornCastle.esp",
                    "DLCFrostcrag.esp",
                    "DLCHorseArmor.esp",
                    "DLCMehrunesRazor.esp",
                    "DLCOrrery.esp",
                    "DLCSpellTomes.esp",
                    "DLCThievesDen.esp",
                    "DLCVileLair.esp",
                ],
                &["Oblivion.ini"],
            ),
            GameId::Tes5 => (
                "Skyrim",
                "TES5Edit",
                &["Skyrim.esm"],
                &["Update.esm", "Dawnguard.esm", "HearthFires.esm", "Dragonborn.esm"],
                &["Skyrim.ini", "SkyrimPrefs.ini"],
            ),
            GameId::Sse => (
                "Skyrim Special Edition",
                "SSEEdit",
                &["Skyrim.esm"],
                &[
                    "Update.esm",
                    "Dawnguard.esm",
                    "HearthFires.esm",
                    "Dragonborn.esm",
                    "_ResourcePack.esl",
                ],
                &["Skyrim.ini", "SkyrimPrefs.ini", "SkyrimCustom.ini"],
            ),
            GameId::Tes5vr => (
                "Skyrim VR",
                "TES5VREdit",
                &["Skyrim.esm"],
                &[
                    "Update.esm",
                    "Dawnguard.esm",
                    "HearthFires.esm",
                    "Dragonborn.esm",
                    "SkyrimVR.esm",
                ],
                &["SkyrimVR.ini", "SkyrimPrefs.ini"],
            ),
            GameId::Enderal => (
                "Enderal",
                "EnderalEdit",
                &["Skyrim.esm"],
                &["Update.esm", "Enderal - Forgotten Stories.esm"],
                &["Enderal.ini", "EnderalPrefs.ini"],
            ),
            GameId::Fo3 => (
                "Fallout 3",
                "FO3Edit",
                &["Fallout3.esm"],
                &[
                    "Anchorage.esm",
                    "ThePitt.esm",
                    "BrokenSteel.esm",
                    "PointLookout.esm",
                    "Zeta.esm",
                ],
                &["FALLOUT.INI", "FalloutPrefs.ini"],
            ),
            GameId::Fnv => (
                "Fallout: New Vegas",
                "FNVEdit",
                &["FalloutNV.esm"],
                &[
                    "DeadMoney.esm",
                    "HonestHearts.esm",
                    "OldWorldBlues.esm",
                    "LonesomeRoad.esm",
                    "GunRunnersArsenal.esm",
                    "CaravanPack.esm",
                    "ClassicPack.esm",
                    "MercenaryPack.esm",
                    "TribalPack.esm",
                ],
                &["Fallout.ini", "FalloutPrefs.ini"],
            ),
            GameId::Fo4 => (
                "Fallout 4",
                "FO4Edit",
                &["Fallout4.esm"],
                &[
                    "DLCRobot.esm",
                    "DLCworkshop01.esm",
                    "DLCworkshop02.esm",
                    "DLCworkshop03.esm",
                    "DLCCoast.esm",
                    "DLCNukaWorld.esm",
                    "DLCUltraHighResolution.esm",
                ],
                &["Fallout4.ini", "Fallout4Prefs.ini", "Fallout4Custom.ini"],
            ),
            GameId::Fo4vr => (
                "Fallout 4 VR",
                "FO4VREdit",
                &["Fallout4.esm"],
                &["Fallout4_VR.esm"],
                &["Fallout4Custom.ini", "Fallout4Prefs.ini"],
            ),
            GameId::Fo76 => (
                "Fallout 76",
                "FO76Edit",
                &["SeventySix.esm"],
                &[],
                &["Fallout76.ini"],
            ),
        };

        Self {
            id: game,
            display_name: display_name.to_string(),
            cleaner_executable: exe.to_string(),
            game_switch: format!("-{}", game.as_str()),
            main_masters: masters.iter().map(|s| s.to_string()).collect(),
            official_content: official.iter().map(|s| s.to_string()).collect(),
            ini_files: inis.iter().map(|s| s.to_string()).collect(),
            cc_pattern: default_cc_pattern(),
        }
    }
}

/// All known game profiles, keyed by id.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<GameId, GameProfile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    /// Registry holding the compiled-in table.
    pub fn builtin() -> Self {
        let profiles = GameId::iter()
            .map(|game| (game, GameProfile::builtin(game)))
            .collect();
        Self { profiles }
    }

    /// Built-in table with entries from `path` layered on top.
    pub fn with_overrides<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut registry = Self::builtin();
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read game profiles from {:?}", path.as_ref())
        })?;
        let overrides: Vec<GameProfile> =
            serde_json::from_str(&content).context("Failed to parse game profiles JSON")?;
        info!(
            "Loaded {} game profile override(s) from {:?}",
            overrides.len(),
            path.as_ref()
        );
        for profile in overrides {
            registry.insert(profile);
        }
        Ok(registry)
    }

    /// Add or replace a profile.
    pub fn insert(&mut self, profile: GameProfile) {
        debug!("Registering game profile {}", profile.id);
        self.profiles.insert(profile.id, profile);
    }

    pub fn get(&self, game: GameId) -> Result<&GameProfile> {
        self.profiles
            .get(&game)
            .ok_or_else(|| CleanerError::UnknownGame(game.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameProfile> {
        self.profiles.values()
    }
}
