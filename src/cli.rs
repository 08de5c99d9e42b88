use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::session::PluginSource;
use crate::types::GameId;

/// plugin-cleaner - batch-clean game plugins with xEdit
#[derive(Parser, Debug)]
#[command(name = "plugin-cleaner")]
#[command(about = "Pick game plugins from a checklist and quick-auto-clean them with xEdit")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Dry-run mode: print the cleaner command lines without launching anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where to read the plugin list from; exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// JSON plugin snapshot
    #[arg(long, value_name = "FILE")]
    pub plugins: Option<PathBuf>,

    /// Mod manager profile directory containing plugins.txt
    #[arg(long, value_name = "DIR")]
    pub profile_dir: Option<PathBuf>,
}

impl SourceArgs {
    pub fn source(&self) -> Option<PluginSource> {
        match (&self.plugins, &self.profile_dir) {
            (Some(file), _) => Some(PluginSource::Snapshot(file.clone())),
            (None, Some(dir)) => Some(PluginSource::ProfileDir(dir.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported games and their cleaner executables
    Games,
    /// Print the default selection (x = checked)
    List {
        #[command(flatten)]
        source: SourceArgs,
        /// Game id (sse, fo4, ...)
        #[arg(short, long)]
        game: Option<GameId>,
    },
    /// Print the cleaner command line for one plugin
    #[command(name = "args")]
    ShowArgs {
        /// Game id (sse, fo4, ...)
        #[arg(short, long)]
        game: GameId,
        /// Plugin file name
        plugin: String,
    },
    /// Clean plugins without the picker
    Clean {
        #[command(flatten)]
        source: SourceArgs,
        /// Game id (sse, fo4, ...)
        #[arg(short, long)]
        game: Option<GameId>,
        /// Clean only these plugins instead of the default selection
        #[arg(long = "only", value_name = "PLUGIN", conflicts_with = "all")]
        only: Vec<String>,
        /// Clean every plugin except the main masters
        #[arg(long)]
        all: bool,
    },
    /// Open the interactive picker
    Pick {
        #[command(flatten)]
        source: SourceArgs,
        /// Game id (sse, fo4, ...)
        #[arg(short, long)]
        game: Option<GameId>,
    },
    /// Show the effective settings
    Settings {
        /// Write default settings to the settings path if none exist
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
