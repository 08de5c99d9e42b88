//! Plugin Cleaner - Main entry point
//!
//! Parses the command line, sets up logging and signal handling, then either
//! runs a headless command or the interactive picker.

use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::CommandFactory;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use plugin_cleaner::app::App;
use plugin_cleaner::batch::{BatchEvent, CancellationToken, ItemOutcome};
use plugin_cleaner::cleaner_args::ToolArgs;
use plugin_cleaner::cli::{Cli, Commands, SourceArgs};
use plugin_cleaner::launcher::raw_command_line;
use plugin_cleaner::process_guard;
use plugin_cleaner::profiles::ProfileRegistry;
use plugin_cleaner::report::RunReport;
use plugin_cleaner::session::{PluginSource, Session};
use plugin_cleaner::settings::CleanerSettings;
use plugin_cleaner::types::GameId;

const LOG_FILE_NAME: &str = "plugin-cleaner.log";

/// Initialize tracing. The picker logs to a file so the screen stays clean.
fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(path) = log_file {
        let file = path
            .parent()
            .map(fs::create_dir_all)
            .transpose()
            .and_then(|_| OpenOptions::new().create(true).append(true).open(path));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
                return;
            }
            Err(e) => eprintln!("Cannot open log file {:?}: {}", path, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn log_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "plugin-cleaner")
        .map(|dirs| dirs.data_dir().join(LOG_FILE_NAME))
}

fn settings_path(cli: &Cli) -> Result<PathBuf> {
    cli.settings
        .clone()
        .or_else(CleanerSettings::default_path)
        .context("Cannot determine a settings location; pass --settings")
}

fn load_settings(cli: &Cli) -> Result<CleanerSettings> {
    let path = settings_path(cli)?;
    debug!("Loading settings from {:?}", path);
    CleanerSettings::load_or_default(&path)
}

fn open_session(cli: &Cli, source: &SourceArgs, game: Option<GameId>) -> Result<Session> {
    let source: PluginSource = source
        .source()
        .context("Pass --plugins FILE or --profile-dir DIR")?;
    Session::open(load_settings(cli)?, &source, game)
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let picker = matches!(cli.command, Some(Commands::Pick { .. }));
    let log_file = if picker { log_file_path() } else { None };
    init_logging(cli.verbose, log_file.as_deref());
    info!("plugin-cleaner {} starting", env!("CARGO_PKG_VERSION"));

    let token = CancellationToken::new();
    if let Err(e) = process_guard::init_signal_handlers(token.clone()) {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let code = match &cli.command {
        Some(Commands::Games) => list_games(&cli)?,
        Some(Commands::List { source, game }) => list_selection(&cli, source, *game)?,
        Some(Commands::ShowArgs { game, plugin }) => show_args(&cli, *game, plugin)?,
        Some(Commands::Clean {
            source,
            game,
            only,
            all,
        }) => clean(&cli, source, *game, only, *all, &token)?,
        Some(Commands::Pick { source, game }) => pick(&cli, source, *game, token)?,
        Some(Commands::Settings { init }) => show_settings(&cli, *init)?,
        None => {
            Cli::command().print_help()?;
            println!();
            2
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn list_games(cli: &Cli) -> Result<i32> {
    let settings = load_settings(cli)?;
    let registry = match &settings.profiles_file {
        Some(path) => ProfileRegistry::with_overrides(path)?,
        None => ProfileRegistry::builtin(),
    };

    for profile in registry.iter() {
        println!("{}", profile.summary_row(settings.exe_name_xedit));
    }
    Ok(0)
}

fn list_selection(cli: &Cli, source: &SourceArgs, game: Option<GameId>) -> Result<i32> {
    let session = open_session(cli, source, game)?;
    let selection = session.selection();

    for entry in selection.entries() {
        let mark = if entry.checked { "x" } else { " " };
        println!("[{}] {} ({})", mark, entry.name, entry.priority);
    }
    println!(
        "{} of {} plugin(s) selected",
        selection.checked_count(),
        selection.len()
    );
    Ok(0)
}

fn show_args(cli: &Cli, game: GameId, plugin: &str) -> Result<i32> {
    let settings = load_settings(cli)?;
    settings.validate().context("Invalid settings")?;
    let registry = match &settings.profiles_file {
        Some(path) => ProfileRegistry::with_overrides(path)?,
        None => ProfileRegistry::builtin(),
    };
    let profile = registry.get(game)?;

    let args = settings.batch_options(profile).cleaner_args(profile, plugin);
    println!("{} {}", args.executable(), raw_command_line(&args.to_cli_args()));
    Ok(0)
}

fn clean(
    cli: &Cli,
    source: &SourceArgs,
    game: Option<GameId>,
    only: &[String],
    all: bool,
    token: &CancellationToken,
) -> Result<i32> {
    let session = open_session(cli, source, game)?;
    let mut selection = session.selection();

    if all {
        selection.select_all();
    } else if !only.is_empty() {
        selection.select_none();
        for name in only {
            if !selection.set_checked(name, true) {
                bail!("{} is not a cleanable plugin of this profile", name);
            }
        }
    }

    let names = selection.checked_names();
    if names.is_empty() {
        println!("Nothing to clean");
        return Ok(0);
    }

    let options = session.options();
    let dry_run = cli.dry_run;
    let mut launcher = session.launcher(dry_run);
    let result = session.run(&names, &mut launcher, token, |event| match event {
        BatchEvent::Starting { name, index, total } => {
            println!("[{}/{}] {}", index + 1, total, name);
            if dry_run {
                let args = options.cleaner_args(&session.profile, name);
                println!(
                    "  [DRY RUN] {} {}",
                    args.executable(),
                    raw_command_line(&args.to_cli_args())
                );
            }
        }
        BatchEvent::Finished {
            outcome: ItemOutcome::Failed { exit_code },
            ..
        } => println!("  exit code {}", exit_code),
        _ => {}
    });

    let report = RunReport::from(&result);
    for line in report.lines() {
        println!("{}", line);
    }
    Ok(report.exit_code())
}

fn pick(
    cli: &Cli,
    source: &SourceArgs,
    game: Option<GameId>,
    token: CancellationToken,
) -> Result<i32> {
    let session = open_session(cli, source, game)?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    if let Err(e) = crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| {
            let mut app = App::new(session, cli.dry_run, token);
            app.run(&mut terminal).map_err(anyhow::Error::from)
        });

    // Always restore the terminal, even if the picker failed
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    match result? {
        Some(report) => {
            for line in report.lines() {
                println!("{}", line);
            }
            Ok(report.exit_code())
        }
        None => Ok(0),
    }
}

fn show_settings(cli: &Cli, init: bool) -> Result<i32> {
    let path = settings_path(cli)?;

    if init {
        if path.exists() {
            println!("Settings already exist at {}", path.display());
        } else {
            CleanerSettings::default().save_to_file(&path)?;
            println!("Wrote default settings to {}", path.display());
        }
    }

    let settings = CleanerSettings::load_or_default(&path)?;
    if let Err(e) = settings.validate() {
        warn!("Settings are invalid: {:#}", e);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?
    );
    Ok(0)
}
