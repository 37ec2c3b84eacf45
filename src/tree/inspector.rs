//! Working-tree inspection.
//!
//! Every probe here is read-only. Dry-run failures of any kind collapse to
//! `false`; only the status query can return an error, since without it the
//! clean check has no answer at all.

use super::tool::{PatchOutcome, StatusEntry, Workspace};
use crate::error::Result;
use crate::registry::PatchDescriptor;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Current state of one patch, derived from dry runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchState {
    /// Reverse dry run succeeds.
    Applied,
    /// Forward dry run succeeds.
    NotApplied,
    /// Neither direction applies; the tree has diverged from the patch.
    Conflict,
    /// The patch file does not exist.
    Missing,
}

impl fmt::Display for PatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Applied => "applied",
            Self::NotApplied => "not applied",
            Self::Conflict => "conflict",
            Self::Missing => "missing",
        };
        f.write_str(label)
    }
}

/// Result of a clean-tree check.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Changes that block patching.
    pub relevant: Vec<StatusEntry>,
    /// Number of changes skipped because they are untracked or ignored.
    pub ignored: usize,
}

impl CleanReport {
    pub fn is_clean(&self) -> bool {
        self.relevant.is_empty()
    }
}

/// Read-only view of the working tree.
pub struct TreeInspector<'a> {
    tree: &'a dyn Workspace,
}

impl<'a> TreeInspector<'a> {
    pub fn new(tree: &'a dyn Workspace) -> Self {
        Self { tree }
    }

    /// Check for uncommitted changes outside `ignore_prefixes`.
    ///
    /// Untracked files never count.
    ///
    /// # Errors
    ///
    /// Returns an error if the status query cannot run.
    pub fn check_clean(&self, ignore_prefixes: &[String]) -> Result<CleanReport> {
        let mut report = CleanReport::default();

        for entry in self.tree.changes()? {
            let ignored = entry.is_untracked()
                || ignore_prefixes
                    .iter()
                    .any(|prefix| entry.path.starts_with(prefix.as_str()));
            if ignored {
                report.ignored += 1;
            } else {
                report.relevant.push(entry);
            }
        }

        debug!(
            "clean check: {} relevant, {} ignored",
            report.relevant.len(),
            report.ignored
        );
        Ok(report)
    }

    /// Shorthand for [`Self::check_clean`] returning only the verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if the status query cannot run.
    pub fn is_clean(&self, ignore_prefixes: &[String]) -> Result<bool> {
        Ok(self.check_clean(ignore_prefixes)?.is_clean())
    }

    /// True iff a reverse dry run of the patch succeeds.
    pub fn is_patch_applied(&self, patch: &PatchDescriptor) -> bool {
        let path = patch.resolve(self.tree.root());
        self.tree.dry_run_reverse(&path).is_ok()
    }

    /// True iff a forward dry run of the patch succeeds.
    pub fn can_apply(&self, patch: &PatchDescriptor) -> bool {
        let path = patch.resolve(self.tree.root());
        self.tree.dry_run_forward(&path).is_ok()
    }

    /// Whether the patch file exists on disk.
    pub fn patch_exists(&self, patch: &PatchDescriptor) -> bool {
        let path = patch.resolve(self.tree.root());
        self.tree.dry_run_forward(&path) != PatchOutcome::NotFound
    }

    /// Classify a patch against the current tree.
    pub fn state(&self, patch: &PatchDescriptor) -> PatchState {
        let path = patch.resolve(self.tree.root());

        let state = match self.tree.dry_run_reverse(&path) {
            PatchOutcome::Ok => PatchState::Applied,
            PatchOutcome::NotFound => PatchState::Missing,
            PatchOutcome::Conflict | PatchOutcome::Failed(_) => {
                match self.tree.dry_run_forward(&path) {
                    PatchOutcome::Ok => PatchState::NotApplied,
                    PatchOutcome::NotFound => PatchState::Missing,
                    PatchOutcome::Conflict | PatchOutcome::Failed(_) => PatchState::Conflict,
                }
            }
        };

        debug!("patch {} is {}", patch.id, state);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_patch, InMemoryTree};

    fn prefixes() -> Vec<String> {
        vec![".planning/".to_string(), ".claude/".to_string()]
    }

    #[test]
    fn test_clean_tree() {
        let tree = InMemoryTree::new();
        let inspector = TreeInspector::new(&tree);
        assert!(inspector.is_clean(&prefixes()).unwrap());
    }

    #[test]
    fn test_untracked_and_ignored_changes_do_not_count() {
        let tree = InMemoryTree::new()
            .with_change("??", "scratch.txt")
            .with_change(" M", ".planning/notes.md")
            .with_change(" M", ".claude/settings.json");
        let inspector = TreeInspector::new(&tree);

        let report = inspector.check_clean(&prefixes()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.ignored, 3);
    }

    #[test]
    fn test_tracked_change_is_relevant() {
        let tree = InMemoryTree::new()
            .with_change(" M", "src/api/app.js")
            .with_change("??", "scratch.txt");
        let inspector = TreeInspector::new(&tree);

        let report = inspector.check_clean(&prefixes()).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.relevant.len(), 1);
        assert_eq!(report.relevant[0].path, "src/api/app.js");
    }

    #[test]
    fn test_prefix_must_match_start_of_path() {
        let tree = InMemoryTree::new().with_change(" M", "src/.planning/file.js");
        let inspector = TreeInspector::new(&tree);
        assert!(!inspector.is_clean(&prefixes()).unwrap());
    }

    #[test]
    fn test_status_failure_is_an_error() {
        let tree = InMemoryTree::new().with_status_error("not a git repository");
        let inspector = TreeInspector::new(&tree);
        assert!(inspector.is_clean(&prefixes()).is_err());
    }

    #[test]
    fn test_state_applied_and_not_applied() {
        let patch = fake_patch("bug-01");
        let tree = InMemoryTree::new().with_patch(&patch);
        let inspector = TreeInspector::new(&tree);

        assert_eq!(inspector.state(&patch), PatchState::NotApplied);
        assert!(inspector.can_apply(&patch));
        assert!(!inspector.is_patch_applied(&patch));

        tree.mark_applied(&patch);
        assert_eq!(inspector.state(&patch), PatchState::Applied);
        assert!(inspector.is_patch_applied(&patch));
        assert!(!inspector.can_apply(&patch));
    }

    #[test]
    fn test_missing_patch_is_not_applied() {
        let patch = fake_patch("bug-01");
        let tree = InMemoryTree::new();
        let inspector = TreeInspector::new(&tree);

        assert!(!inspector.is_patch_applied(&patch));
        assert!(!inspector.patch_exists(&patch));
        assert_eq!(inspector.state(&patch), PatchState::Missing);
    }

    #[test]
    fn test_diverged_tree_is_conflict() {
        let patch = fake_patch("bug-03");
        let tree = InMemoryTree::new().with_conflicting_patch(&patch);
        let inspector = TreeInspector::new(&tree);

        assert!(!inspector.is_patch_applied(&patch));
        assert!(!inspector.can_apply(&patch));
        assert_eq!(inspector.state(&patch), PatchState::Conflict);
    }

    #[test]
    fn test_probes_never_mutate() {
        let patch = fake_patch("bug-01");
        let tree = InMemoryTree::new().with_patch(&patch);
        let inspector = TreeInspector::new(&tree);

        let _ = inspector.state(&patch);
        let _ = inspector.can_apply(&patch);
        let _ = inspector.is_patch_applied(&patch);
        assert_eq!(tree.mutation_count(), 0);
    }
}
