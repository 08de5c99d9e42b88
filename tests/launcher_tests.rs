//! Tests for launching real processes
//!
//! Uses `true`/`false` from the system as stand-in cleaners, registered
//! under xEdit-style names.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use plugin_cleaner::batch::{self, BatchOptions, CancellationToken};
use plugin_cleaner::launcher::{ProcessLauncher, SIGNALLED_EXIT_CODE, SystemLauncher, WaitOutcome};
use plugin_cleaner::profiles::GameProfile;
use plugin_cleaner::types::GameId;

fn launcher_with(name: &str, program: &str) -> SystemLauncher {
    let mut executables = BTreeMap::new();
    executables.insert(name.to_string(), PathBuf::from(program));
    SystemLauncher::new(executables, Vec::new())
}

#[test]
fn test_exit_codes_are_reported() {
    let mut launcher = launcher_with("SSEEdit", "true");
    let handle = launcher.start("SSEEdit", &[]).expect("true starts");
    assert_eq!(launcher.wait(handle), WaitOutcome::Exited(0));

    let mut launcher = launcher_with("SSEEdit", "false");
    let handle = launcher.start("SSEEdit", &[]).expect("false starts");
    assert_eq!(launcher.wait(handle), WaitOutcome::Exited(1));
}

#[test]
fn test_missing_executable_does_not_start() {
    let mut launcher = launcher_with("SSEEdit", "/nonexistent/SSEEdit.exe");
    assert!(launcher.start("SSEEdit", &[]).is_none());
}

#[test]
fn test_signalled_process_is_a_failure() {
    let mut launcher = launcher_with("sh", "sh");
    let handle = launcher
        .start("sh", &["-c".to_string(), "kill -9 $$".to_string()])
        .expect("sh starts");
    assert_eq!(launcher.wait(handle), WaitOutcome::Exited(SIGNALLED_EXIT_CODE));
}

#[test]
fn test_wrapper_prefixes_command() {
    let mut launcher = SystemLauncher::new(BTreeMap::new(), vec!["env".to_string()]);
    let handle = launcher.start("true", &[]).expect("env true starts");
    assert_eq!(launcher.wait(handle), WaitOutcome::Exited(0));
}

#[test]
fn test_batch_with_real_processes() {
    let profile = GameProfile::builtin(GameId::Sse);
    let mut launcher = launcher_with("SSEEdit", "true");
    let token = CancellationToken::new();
    let selected = vec!["A.esp".to_string(), "B.esp".to_string()];

    let result = batch::run(
        &selected,
        |_| 0,
        &profile,
        &BatchOptions::default(),
        &mut launcher,
        &token,
        |_| {},
    );
    assert_eq!(result.succeeded_count, 2);
    assert!(result.is_clean());
}
