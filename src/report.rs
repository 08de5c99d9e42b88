//! End-of-run reporting.
//!
//! A run produces exactly one summary: the list of plugins that failed, or
//! the number cleaned. A launch failure is reported separately before it,
//! since it needs the user to fix their setup.

use std::fmt;

use crate::batch::CleanResult;

/// The one summary shown after a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Failed { names: Vec<String> },
    Succeeded { count: usize },
}

impl Summary {
    pub fn title(&self) -> &'static str {
        match self {
            Summary::Failed { .. } => "Failed to clean some plugins!",
            Summary::Succeeded { .. } => "Clean successful",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Summary::Failed { names } => names.join("\n"),
            Summary::Succeeded { count } => format!("Successfully cleaned {} plugins", count),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Summary::Failed { .. })
    }
}

impl From<&CleanResult> for Summary {
    fn from(result: &CleanResult) -> Self {
        if result.failed_names.is_empty() {
            Summary::Succeeded {
                count: result.succeeded_count,
            }
        } else {
            Summary::Failed {
                names: result.failed_names.clone(),
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.title(), self.body())
    }
}

/// Blocking error shown when the cleaner could not be started at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchError {
    pub executable: String,
}

impl LaunchError {
    pub fn title(&self) -> String {
        format!("Failed to start {}", self.executable)
    }

    pub fn body(&self) -> String {
        format!("Make sure {} is registered as a tool", self.executable)
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.title(), self.body())
    }
}

/// Everything the user is told about a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub launch_error: Option<LaunchError>,
    pub summary: Summary,
    pub canceled: bool,
}

impl RunReport {
    /// Process exit code for the CLI: 0 clean, 1 failures, 130 cancelled.
    pub fn exit_code(&self) -> i32 {
        if self.launch_error.is_some() || self.summary.is_failure() {
            1
        } else if self.canceled {
            130
        } else {
            0
        }
    }

    /// Lines for terminal output.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(err) = &self.launch_error {
            lines.push(format!("✗ {}", err.title()));
            lines.push(format!("  {}", err.body()));
        }
        if self.canceled {
            lines.push("Cleaning was cancelled before all plugins were processed".to_string());
        }
        match &self.summary {
            Summary::Failed { names } => {
                lines.push(format!("✗ {}", self.summary.title()));
                lines.extend(names.iter().map(|name| format!("  {}", name)));
            }
            Summary::Succeeded { .. } => lines.push(format!("✓ {}", self.summary.body())),
        }
        lines
    }
}

impl From<&CleanResult> for RunReport {
    fn from(result: &CleanResult) -> Self {
        Self {
            launch_error: result.launch_failure.as_ref().map(|exe| LaunchError {
                executable: exe.clone(),
            }),
            summary: Summary::from(result),
            canceled: result.canceled,
        }
    }
}
