//! Starting and waiting on cleaner processes.
//!
//! `ProcessLauncher` is the seam between the batch and the operating system:
//! `start` either yields a handle or reports that nothing could be started,
//! `wait` blocks until the process exits. Tests and `--dry-run` swap in
//! other implementations.
//!
//! # Lifecycle
//!
//! `SystemLauncher` spawns each cleaner in its own process group and
//! registers the PID with `ChildRegistry::global()`, so an interrupted
//! front end takes the cleaner down with it.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use tracing::{debug, error, info, warn};

use crate::process_guard::{ChildRegistry, CommandProcessGroup};

/// Exit code recorded for a process killed by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Opaque handle to a started process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle(pub u64);

/// Result of waiting on a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Process ran to completion with this exit code.
    Exited(i32),
    /// The process could not be tracked to completion.
    Untracked,
}

/// Starts external tools and waits for them.
pub trait ProcessLauncher {
    /// Start `executable` with `args`. `None` if no process was started.
    fn start(&mut self, executable: &str, args: &[String]) -> Option<ProcessHandle>;

    /// Block until the process behind `handle` exits.
    fn wait(&mut self, handle: ProcessHandle) -> WaitOutcome;
}

impl<L: ProcessLauncher + ?Sized> ProcessLauncher for Box<L> {
    fn start(&mut self, executable: &str, args: &[String]) -> Option<ProcessHandle> {
        (**self).start(executable, args)
    }

    fn wait(&mut self, handle: ProcessHandle) -> WaitOutcome {
        (**self).wait(handle)
    }
}

/// Launches real processes.
///
/// Executables are looked up in the user's registry first (name -> path);
/// unregistered names are resolved through `PATH`. When a wrapper is
/// configured (e.g. `["wine"]`), the command becomes
/// `wrapper... <executable> args...`.
#[derive(Debug, Default)]
pub struct SystemLauncher {
    executables: BTreeMap<String, PathBuf>,
    wrapper: Vec<String>,
    children: HashMap<ProcessHandle, Child>,
    next_handle: u64,
}

impl SystemLauncher {
    pub fn new(executables: BTreeMap<String, PathBuf>, wrapper: Vec<String>) -> Self {
        Self {
            executables,
            wrapper,
            children: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Full command line that `start` would spawn (program first).
    pub fn command_line(&self, executable: &str, args: &[String]) -> Vec<String> {
        let resolved = self
            .executables
            .get(executable)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| executable.to_string());

        self.wrapper
            .iter()
            .cloned()
            .chain(std::iter::once(resolved))
            .chain(args.iter().cloned())
            .collect()
    }

    fn build_command(&self, executable: &str, args: &[String]) -> Option<Command> {
        let line = self.command_line(executable, args);
        let (program, rest) = line.split_first()?;
        let mut cmd = Command::new(program);

        // Arguments carry their own quoting; std must not escape it again
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if !rest.is_empty() {
                cmd.raw_arg(raw_command_line(rest));
            }
        }
        #[cfg(not(windows))]
        cmd.args(rest);

        cmd.stdin(Stdio::null()).in_new_process_group();
        Some(cmd)
    }
}

/// Arguments joined into the command line the tool receives.
///
/// The argument list is already quoted (`-D:"..."`, `"plugin"`) for xEdit's
/// own parser, which has no backslash escapes, so this is a plain space join.
/// On Windows it is passed to the process verbatim.
pub fn raw_command_line(args: &[String]) -> String {
    args.join(" ")
}

impl ProcessLauncher for SystemLauncher {
    fn start(&mut self, executable: &str, args: &[String]) -> Option<ProcessHandle> {
        if !self.executables.contains_key(executable) {
            debug!("{} is not registered, resolving through PATH", executable);
        }

        let mut cmd = self.build_command(executable, args)?;
        info!(
            "Starting {} {}",
            self.command_line(executable, &[]).join(" "),
            raw_command_line(args)
        );

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to spawn {}: {}", executable, e);
                return None;
            }
        };

        let pid = child.id();
        match ChildRegistry::global().lock() {
            Ok(mut registry) => registry.register(pid),
            Err(e) => warn!("Child registry poisoned, PID {} not tracked: {}", pid, e),
        }

        let handle = ProcessHandle(self.next_handle);
        self.next_handle += 1;
        self.children.insert(handle, child);
        Some(handle)
    }

    fn wait(&mut self, handle: ProcessHandle) -> WaitOutcome {
        let Some(mut child) = self.children.remove(&handle) else {
            warn!("Unknown process handle {:?}", handle);
            return WaitOutcome::Untracked;
        };

        let pid = child.id();
        let status = child.wait();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        match status {
            Ok(status) => {
                let code = status.code().unwrap_or(SIGNALLED_EXIT_CODE);
                debug!("PID {} exited with {}", pid, code);
                WaitOutcome::Exited(code)
            }
            Err(e) => {
                error!("Failed waiting for PID {}: {}", pid, e);
                WaitOutcome::Untracked
            }
        }
    }
}

/// Logs what would be launched and pretends every run succeeded.
#[derive(Debug, Default)]
pub struct DryRunLauncher {
    /// `(executable, args)` for every `start` call, in order
    pub invocations: Vec<(String, Vec<String>)>,
}

impl DryRunLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessLauncher for DryRunLauncher {
    fn start(&mut self, executable: &str, args: &[String]) -> Option<ProcessHandle> {
        info!("[DRY RUN] {} {}", executable, raw_command_line(args));
        self.invocations.push((executable.to_string(), args.to_vec()));
        Some(ProcessHandle(self.invocations.len() as u64))
    }

    fn wait(&mut self, _handle: ProcessHandle) -> WaitOutcome {
        WaitOutcome::Exited(0)
    }
}
