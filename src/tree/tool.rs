//! Patch tool abstraction and its git implementation.
//!
//! Orchestration never shells out directly. It talks to a [`PatchTool`] for
//! dry runs and real applies, and to a [`TreeStatus`] for the list of
//! uncommitted changes. [`GitRepo`] backs both with `git apply` and
//! `git status --porcelain`; tests use the in-memory fake in
//! [`crate::testing::mocks`].

use crate::error::{DemoError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of one patch tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The tool accepted the patch in the requested direction.
    Ok,
    /// The patch does not fit the current tree in that direction.
    Conflict,
    /// The patch file does not exist.
    NotFound,
    /// The tool could not run or reported an error during a real apply.
    Failed(String),
}

impl PatchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Direction of a patch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Reverse => f.write_str("reverse"),
        }
    }
}

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Two-character XY status code, e.g. ` M` or `??`.
    pub code: String,
    /// Path relative to the repository root (destination path for renames).
    pub path: String,
}

impl StatusEntry {
    pub fn new(code: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
        }
    }

    /// Parse a porcelain v1 line. Returns `None` for blank or malformed lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.len() < 4 || !line.is_char_boundary(2) || !line.is_char_boundary(3) {
            return None;
        }

        let code = &line[..2];
        let mut path = &line[3..];
        if let Some((_, renamed_to)) = path.split_once(" -> ") {
            path = renamed_to;
        }
        let path = path.trim_matches('"');

        Some(Self::new(code, path))
    }

    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.path)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Apply and reverse unified diffs, each with a side-effect-free dry run.
pub trait PatchTool {
    /// Check whether `patch` applies forward without touching the tree.
    fn dry_run_forward(&self, patch: &Path) -> PatchOutcome;

    /// Check whether `patch` can be reversed without touching the tree.
    fn dry_run_reverse(&self, patch: &Path) -> PatchOutcome;

    /// Apply `patch` to the tree.
    fn apply_forward(&self, patch: &Path) -> PatchOutcome;

    /// Reverse `patch` on the tree.
    fn apply_reverse(&self, patch: &Path) -> PatchOutcome;
}

/// Report uncommitted changes in the working tree.
pub trait TreeStatus {
    /// List working-tree changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the status query itself cannot run, e.g. the
    /// directory is not a repository.
    fn changes(&self) -> Result<Vec<StatusEntry>>;

    /// Root directory patch paths are resolved against.
    fn root(&self) -> &Path;
}

/// A working tree that can be both inspected and patched.
pub trait Workspace: PatchTool + TreeStatus {}

impl<T: PatchTool + TreeStatus> Workspace for T {}

// ============================================================================
// Git implementation
// ============================================================================

/// Working tree backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitRepo {
    project_dir: PathBuf,
}

impl GitRepo {
    /// Create a repository handle rooted at `project_dir`.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Verify that `git` is installed.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::MissingTool`] if `git` is not on PATH.
    pub fn ensure_available() -> Result<PathBuf> {
        which::which("git").map_err(|_| DemoError::MissingTool {
            tool: "git".to_string(),
        })
    }

    fn run_apply(&self, patch: &Path, direction: Direction, check: bool) -> PatchOutcome {
        if !patch.exists() {
            debug!("patch file missing: {}", patch.display());
            return PatchOutcome::NotFound;
        }

        let mut cmd = Command::new("git");
        cmd.arg("apply");
        if direction == Direction::Reverse {
            cmd.arg("--reverse");
        }
        if check {
            cmd.arg("--check");
        }
        cmd.arg(patch).current_dir(&self.project_dir);

        debug!(
            "git apply {} (check: {}) {}",
            direction,
            check,
            patch.display()
        );

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => return PatchOutcome::Failed(format!("failed to execute git apply: {}", e)),
        };

        if output.status.success() {
            return PatchOutcome::Ok;
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!("git apply rejected {}: {}", patch.display(), stderr);
        if check {
            PatchOutcome::Conflict
        } else {
            PatchOutcome::Failed(stderr)
        }
    }
}

impl PatchTool for GitRepo {
    fn dry_run_forward(&self, patch: &Path) -> PatchOutcome {
        self.run_apply(patch, Direction::Forward, true)
    }

    fn dry_run_reverse(&self, patch: &Path) -> PatchOutcome {
        self.run_apply(patch, Direction::Reverse, true)
    }

    fn apply_forward(&self, patch: &Path) -> PatchOutcome {
        self.run_apply(patch, Direction::Forward, false)
    }

    fn apply_reverse(&self, patch: &Path) -> PatchOutcome {
        self.run_apply(patch, Direction::Reverse, false)
    }
}

impl TreeStatus for GitRepo {
    fn changes(&self) -> Result<Vec<StatusEntry>> {
        let output = Command::new("git")
            .args(["status", "--porcelain"])
            .current_dir(&self.project_dir)
            .output()
            .map_err(|e| DemoError::git("status", format!("failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DemoError::git("status", stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().filter_map(StatusEntry::parse).collect())
    }

    fn root(&self) -> &Path {
        &self.project_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::GitFixture;

    #[test]
    fn test_parse_modified_line() {
        let entry = StatusEntry::parse(" M src/api/app.js").unwrap();
        assert_eq!(entry.code, " M");
        assert_eq!(entry.path, "src/api/app.js");
        assert!(!entry.is_untracked());
    }

    #[test]
    fn test_parse_untracked_line() {
        let entry = StatusEntry::parse("?? notes.txt").unwrap();
        assert!(entry.is_untracked());
        assert_eq!(entry.path, "notes.txt");
    }

    #[test]
    fn test_parse_rename_uses_destination() {
        let entry = StatusEntry::parse("R  old/name.js -> new/name.js").unwrap();
        assert_eq!(entry.path, "new/name.js");
    }

    #[test]
    fn test_parse_quoted_path() {
        let entry = StatusEntry::parse(r#" M "dir with space/file.js""#).unwrap();
        assert_eq!(entry.path, "dir with space/file.js");
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        assert!(StatusEntry::parse("").is_none());
        assert!(StatusEntry::parse(" M").is_none());
    }

    #[test]
    fn test_missing_patch_is_not_found() {
        let fixture = GitFixture::new();
        let repo = GitRepo::new(fixture.path());
        let missing = fixture.path().join("nope.patch");
        assert_eq!(repo.dry_run_forward(&missing), PatchOutcome::NotFound);
        assert_eq!(repo.apply_reverse(&missing), PatchOutcome::NotFound);
    }

    #[test]
    fn test_dry_runs_track_applied_state() {
        let fixture = GitFixture::new();
        let patch = fixture.bug_patch("bug-01");
        let repo = GitRepo::new(fixture.path());

        assert_eq!(repo.dry_run_forward(&patch), PatchOutcome::Ok);
        assert_eq!(repo.dry_run_reverse(&patch), PatchOutcome::Conflict);

        assert_eq!(repo.apply_forward(&patch), PatchOutcome::Ok);
        assert_eq!(repo.dry_run_forward(&patch), PatchOutcome::Conflict);
        assert_eq!(repo.dry_run_reverse(&patch), PatchOutcome::Ok);

        assert_eq!(repo.apply_reverse(&patch), PatchOutcome::Ok);
        assert_eq!(repo.dry_run_forward(&patch), PatchOutcome::Ok);
    }

    #[test]
    fn test_dry_run_has_no_side_effects() {
        let fixture = GitFixture::new();
        let patch = fixture.bug_patch("bug-01");
        let repo = GitRepo::new(fixture.path());

        let _ = repo.dry_run_forward(&patch);
        assert!(repo.changes().unwrap().iter().all(|c| c.is_untracked()));
    }

    #[test]
    fn test_status_reports_modified_file() {
        let fixture = GitFixture::new();
        fixture.write("src/bug-01.txt", "edited by hand\n");
        let repo = GitRepo::new(fixture.path());

        let changes = repo.changes().unwrap();
        assert!(changes
            .iter()
            .any(|c| c.path == "src/bug-01.txt" && !c.is_untracked()));
    }

    #[test]
    fn test_status_outside_repository_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let repo = GitRepo::new(temp.path());
        let err = repo.changes().unwrap_err();
        assert!(matches!(err, DemoError::Git { .. }));
    }
}
