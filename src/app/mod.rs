//! Application module
//!
//! Contains the picker's event loop. The batch runs on a worker thread and
//! reports back over a channel; the UI thread only renders and handles keys.
//!
//! # Module Structure
//! - `state` - Application state types (AppState, AppMode, AppAction)
//! - Main module - App struct and event loop

mod state;

pub use state::{AppAction, AppMode, AppState, Progress};

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{Event, KeyEventKind};
use ratatui::{Terminal, backend::Backend};
use tracing::{debug, info, warn};

use crate::batch::{BatchEvent, CancellationToken, CleanResult};
use crate::error::{CleanerError, Result};
use crate::process_guard::ProcessGuard;
use crate::report::RunReport;
use crate::session::Session;
use crate::ui;

/// Messages sent from the batch worker to the UI thread
#[derive(Debug)]
pub enum WorkerMessage {
    Event(BatchEvent),
    Complete(CleanResult),
}

/// Main application struct
pub struct App {
    state: AppState,
    session: Arc<Session>,
    dry_run: bool,
    token: CancellationToken,
    worker_tx: Sender<WorkerMessage>,
    worker_rx: Receiver<WorkerMessage>,
    worker: Option<JoinHandle<()>>,
    /// Terminates any cleaner still running when the picker goes away
    _process_guard: ProcessGuard,
}

impl App {
    pub fn new(session: Session, dry_run: bool, token: CancellationToken) -> Self {
        let title = format!(
            "{} - {}",
            session.profile.display_name,
            session.profile.executable(session.settings.exe_name_xedit)
        );
        let state = AppState::new(session.selection(), title);
        let (worker_tx, worker_rx) = mpsc::channel();
        debug!("Picker created with {} entries", state.selection.len());

        Self {
            state,
            session: Arc::new(session),
            dry_run,
            token,
            worker_tx,
            worker_rx,
            worker: None,
            _process_guard: ProcessGuard::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run until the user quits. Returns the report if a batch ran.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Option<RunReport>> {
        loop {
            terminal
                .draw(|f| ui::render(f, &self.state))
                .map_err(|e| CleanerError::terminal(format!("Failed to draw: {}", e)))?;

            self.drain_worker();

            if self.state.quit_requested && self.worker.is_none() {
                break;
            }

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let action = self.state.handle_key(key);
                    if self.apply(action)? {
                        break;
                    }
                }
            }
        }

        Ok(self.state.report.clone())
    }

    /// Carry out a key action. Returns true when the loop should exit.
    fn apply(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::None => Ok(false),
            AppAction::Quit => Ok(true),
            AppAction::Cancel => {
                info!("Cancel requested from picker");
                self.token.cancel();
                Ok(false)
            }
            AppAction::StartCleaning(names) => {
                self.spawn_worker(names)?;
                Ok(false)
            }
        }
    }

    fn spawn_worker(&mut self, names: Vec<String>) -> Result<()> {
        if self.worker.is_some() {
            return Err(CleanerError::state("A batch is already running"));
        }

        let session = Arc::clone(&self.session);
        let token = self.token.clone();
        let tx = self.worker_tx.clone();
        let dry_run = self.dry_run;

        let handle = thread::Builder::new()
            .name("batch".to_string())
            .spawn(move || {
                let mut launcher = session.launcher(dry_run);
                let result = session.run(&names, &mut launcher, &token, |event| {
                    let _ = tx.send(WorkerMessage::Event(event.clone()));
                });
                let _ = tx.send(WorkerMessage::Complete(result));
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    fn drain_worker(&mut self) {
        while let Ok(message) = self.worker_rx.try_recv() {
            match message {
                WorkerMessage::Event(event) => self.state.apply_event(&event),
                WorkerMessage::Complete(result) => {
                    self.state.finish(&result);
                    if let Some(handle) = self.worker.take() {
                        if handle.join().is_err() {
                            warn!("Batch worker panicked");
                        }
                    }
                }
            }
        }
    }
}
