//! Type-safe identifiers for plugin-cleaner
//!
//! Game ids and sort orders are enums rather than strings so settings files
//! and CLI flags are validated once, at parse time.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Supported game, identified by the xEdit game switch without the dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameId {
    /// Oblivion
    Tes4,
    /// Skyrim (original release)
    Tes5,
    /// Skyrim Special/Anniversary Edition
    Sse,
    /// Skyrim VR
    Tes5vr,
    /// Enderal
    Enderal,
    /// Fallout 3
    Fo3,
    /// Fallout: New Vegas
    Fnv,
    /// Fallout 4
    Fo4,
    /// Fallout 4 VR
    Fo4vr,
    /// Fallout 76
    Fo76,
}

impl GameId {
    /// Lowercase id, identical to `to_string()` but without allocating.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Tes4 => "tes4",
            GameId::Tes5 => "tes5",
            GameId::Sse => "sse",
            GameId::Tes5vr => "tes5vr",
            GameId::Enderal => "enderal",
            GameId::Fo3 => "fo3",
            GameId::Fnv => "fnv",
            GameId::Fo4 => "fo4",
            GameId::Fo4vr => "fo4vr",
            GameId::Fo76 => "fo76",
        }
    }
}

/// Display order of the plugin checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    /// Ascending load-order priority
    #[default]
    Priority,
    /// Ascending name, case-sensitive
    Name,
}

impl SortOrder {
    /// The other order; used by the picker's sort toggle.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Priority => SortOrder::Name,
            SortOrder::Name => SortOrder::Priority,
        }
    }
}
