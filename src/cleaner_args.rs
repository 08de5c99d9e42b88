//! Type-safe cleaner argument contracts.
//!
//! xEdit's quick-auto-clean mode is driven entirely by its command line, so
//! the argument list is the one interface we must get bit-exact. Instead of
//! pushing strings ad hoc, `CleanerArgs` holds the typed inputs and
//! `to_cli_args()` renders them in the fixed order xEdit expects.

/// Switches that put xEdit into unattended quick-auto-clean mode.
pub const BASE_FLAGS: [&str; 4] = [
    "-IKnowWhatImDoing",
    "-QuickAutoClean",
    "-autoexit",
    "-autoload",
];

/// Trait for typed tool arguments.
///
/// # Contract
///
/// - `executable()`: the registered tool name to launch (e.g. `"FO4Edit"`).
/// - `to_cli_args()`: argv after the executable, exactly as the tool
///   expects it. Quoting is part of the contract: values are wrapped in
///   literal double quotes where the tool parses them that way.
pub trait ToolArgs {
    fn executable(&self) -> &str;

    fn to_cli_args(&self) -> Vec<String>;
}

/// Game selection passed to xEdit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSwitch {
    /// The profile's switch, dash included (e.g. `-sse`).
    Profile(String),
    /// Legacy free-form setting, rendered as `-<arg>`.
    Explicit(String),
}

impl GameSwitch {
    /// Explicit argument wins over the profile switch when non-empty.
    pub fn resolve(profile_switch: &str, explicit: Option<&str>) -> Self {
        match explicit.map(str::trim).filter(|arg| !arg.is_empty()) {
            Some(arg) => GameSwitch::Explicit(arg.to_string()),
            None => GameSwitch::Profile(profile_switch.to_string()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            GameSwitch::Profile(switch) => switch.clone(),
            GameSwitch::Explicit(arg) => format!("-{}", arg),
        }
    }
}

/// Arguments for cleaning one plugin.
///
/// # Argument order
///
/// | Position | Value | When |
/// |----------|-------|------|
/// | 1-4 | `BASE_FLAGS` | always |
/// | next | `-D:"<data dir>"` | `data_path` set |
/// | next | `-I:"<documents dir>/<ini>"` | `ini_path` set |
/// | next | game switch | always |
/// | last | `"<plugin>"` | always |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerArgs {
    pub executable: String,
    pub plugin: String,
    pub data_path: Option<String>,
    pub ini_path: Option<String>,
    pub game_switch: GameSwitch,
}

impl ToolArgs for CleanerArgs {
    fn executable(&self) -> &str {
        &self.executable
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args: Vec<String> = BASE_FLAGS.iter().map(|flag| flag.to_string()).collect();

        if let Some(data) = &self.data_path {
            args.push(format!("-D:\"{}\"", data));
        }
        if let Some(ini) = &self.ini_path {
            args.push(format!("-I:\"{}\"", ini));
        }

        args.push(self.game_switch.render());
        args.push(format!("\"{}\"", self.plugin));
        args
    }
}
