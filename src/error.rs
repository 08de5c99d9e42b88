//! Error handling module for plugin-cleaner
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Per-plugin cleaning failures are NOT errors: they are collected into
//! `CleanResult`. This type covers everything that stops us before or
//! outside a batch run.

use thiserror::Error;

/// Main error type for plugin-cleaner
#[derive(Error, Debug)]
pub enum CleanerError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings errors (loading, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plugin snapshot errors (missing or malformed plugin lists)
    #[error("Plugin list error: {0}")]
    Snapshot(String),

    /// No game profile registered for the requested id
    #[error("Unknown game '{0}'")]
    UnknownGame(String),

    /// Invalid CC plugin pattern in a game profile
    #[error("Invalid plugin pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// State errors (mutex poisoning, invalid state)
    #[error("State error: {0}")]
    State(String),
}

/// Result type alias for plugin-cleaner operations
pub type Result<T> = std::result::Result<T, CleanerError>;

// Convenient error constructors
impl CleanerError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a plugin snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}
