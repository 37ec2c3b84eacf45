//! Test oracle.
//!
//! Runs test commands and compares their outcome to what a scenario expects.
//! A failing test run is an ordinary result, never an error: injecting a bug
//! is supposed to make tests fail.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Outcome of one test command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl TestOutcome {
    /// Map process success to an outcome.
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Comparison of an actual outcome against an expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Matches,
    Unexpected,
}

/// Compare `actual` with `expected`.
pub fn verify_expectation(actual: TestOutcome, expected: TestOutcome) -> Verdict {
    if actual == expected {
        Verdict::Matches
    } else {
        Verdict::Unexpected
    }
}

/// Operator-facing explanation of a mismatch, `None` when outcomes agree.
pub fn describe_mismatch(actual: TestOutcome, expected: TestOutcome) -> Option<&'static str> {
    match (actual, expected) {
        (TestOutcome::Passed, TestOutcome::Failed) => {
            Some("Tests PASSED but should FAIL. Bug may not be properly introduced.")
        }
        (TestOutcome::Failed, TestOutcome::Passed) => {
            Some("Tests FAILED unexpectedly. Other issues may exist in the codebase.")
        }
        _ => None,
    }
}

/// Executes test commands.
pub trait TestRunner {
    /// Run `command` to completion and report its outcome.
    fn run(&self, command: &str) -> TestOutcome;
}

/// Where test command output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Inherit,
    Stderr,
    Discard,
}

/// Runs test commands through the platform shell with inherited stdio, so
/// output reaches the operator unmodified.
#[derive(Debug, Clone)]
pub struct ShellTestRunner {
    project_dir: PathBuf,
    output: OutputMode,
}

impl ShellTestRunner {
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            output: OutputMode::Inherit,
        }
    }

    /// Discard test output instead of streaming it.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.output = OutputMode::Discard;
        self
    }

    /// Send the test's stdout to our stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = OutputMode::Stderr;
        self
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

impl TestRunner for ShellTestRunner {
    fn run(&self, command: &str) -> TestOutcome {
        debug!("running test command: {}", command);

        let mut cmd = Self::shell_command(command);
        cmd.current_dir(&self.project_dir).stdin(Stdio::null());
        match self.output {
            OutputMode::Inherit => {}
            OutputMode::Stderr => {
                cmd.stdout(io::stderr());
            }
            OutputMode::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        match cmd.status() {
            Ok(status) => {
                debug!("test command exited with {:?}", status.code());
                TestOutcome::from_success(status.success())
            }
            Err(e) => {
                warn!("failed to start test command '{}': {}", command, e);
                TestOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verify_expectation() {
        assert_eq!(
            verify_expectation(TestOutcome::Failed, TestOutcome::Failed),
            Verdict::Matches
        );
        assert_eq!(
            verify_expectation(TestOutcome::Passed, TestOutcome::Failed),
            Verdict::Unexpected
        );
    }

    #[test]
    fn test_describe_mismatch() {
        assert!(describe_mismatch(TestOutcome::Passed, TestOutcome::Failed)
            .unwrap()
            .contains("should FAIL"));
        assert!(describe_mismatch(TestOutcome::Failed, TestOutcome::Passed)
            .unwrap()
            .contains("unexpectedly"));
        assert!(describe_mismatch(TestOutcome::Passed, TestOutcome::Passed).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_maps_exit_codes() {
        let temp = TempDir::new().unwrap();
        let runner = ShellTestRunner::new(temp.path()).quiet();
        assert_eq!(runner.run("exit 0"), TestOutcome::Passed);
        assert_eq!(runner.run("exit 3"), TestOutcome::Failed);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_missing_program_is_failure() {
        let temp = TempDir::new().unwrap();
        let runner = ShellTestRunner::new(temp.path()).quiet();
        assert_eq!(
            runner.run("definitely-not-a-real-test-runner --all"),
            TestOutcome::Failed
        );
    }

    #[test]
    fn test_shell_runner_bad_directory_is_failure() {
        let runner = ShellTestRunner::new("/nonexistent/patchdemo/dir").quiet();
        assert_eq!(runner.run("exit 0"), TestOutcome::Failed);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_uses_project_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "x").unwrap();
        let runner = ShellTestRunner::new(temp.path()).quiet();
        assert_eq!(runner.run("test -f marker"), TestOutcome::Passed);
    }
}
