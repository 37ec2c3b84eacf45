//! Patch application.
//!
//! Each mutation is preceded by dry runs so that "already in state" and
//! "conflict" are detected without touching the tree. A real apply or
//! reverse that fails after a successful dry run leaves the tree in an
//! unknown state and is returned as an error.

use super::inspector::TreeInspector;
use super::tool::{PatchOutcome, Workspace};
use crate::error::{DemoError, Result};
use crate::registry::PatchDescriptor;
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of [`PatchApplier::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
    Conflict,
}

/// Outcome of [`PatchApplier::reverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReverseOutcome {
    Reversed,
    NotApplied,
}

/// Applies and reverses registered patches.
pub struct PatchApplier<'a> {
    tree: &'a dyn Workspace,
}

impl<'a> PatchApplier<'a> {
    pub fn new(tree: &'a dyn Workspace) -> Self {
        Self { tree }
    }

    fn inspector(&self) -> TreeInspector<'a> {
        TreeInspector::new(self.tree)
    }

    /// Apply a patch unless it is already applied or conflicts.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::MissingPatch`] if the file does not exist and
    /// [`DemoError::ApplyFailed`] if the real apply fails.
    pub fn apply(&self, patch: &PatchDescriptor) -> Result<ApplyOutcome> {
        let path = patch.resolve(self.tree.root());
        let inspector = self.inspector();

        if inspector.is_patch_applied(patch) {
            debug!("{} already applied", patch.id);
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        match self.tree.dry_run_forward(&path) {
            PatchOutcome::Ok => {}
            PatchOutcome::NotFound => return Err(DemoError::missing_patch(&patch.id, path)),
            PatchOutcome::Conflict | PatchOutcome::Failed(_) => {
                debug!("{} cannot be applied", patch.id);
                return Ok(ApplyOutcome::Conflict);
            }
        }

        match self.tree.apply_forward(&path) {
            PatchOutcome::Ok => {
                info!("applied {}", patch.id);
                Ok(ApplyOutcome::Applied)
            }
            PatchOutcome::NotFound => Err(DemoError::missing_patch(&patch.id, path)),
            PatchOutcome::Conflict => Err(DemoError::ApplyFailed {
                id: patch.id.clone(),
                message: "tree changed between check and apply".to_string(),
            }),
            PatchOutcome::Failed(message) => Err(DemoError::ApplyFailed {
                id: patch.id.clone(),
                message,
            }),
        }
    }

    /// Reverse a patch if it is currently applied.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::MissingPatch`] if the file does not exist and
    /// [`DemoError::ReverseFailed`] if the real reverse fails.
    pub fn reverse(&self, patch: &PatchDescriptor) -> Result<ReverseOutcome> {
        let path = patch.resolve(self.tree.root());

        match self.tree.dry_run_reverse(&path) {
            PatchOutcome::Ok => {}
            PatchOutcome::NotFound => return Err(DemoError::missing_patch(&patch.id, path)),
            PatchOutcome::Conflict | PatchOutcome::Failed(_) => {
                debug!("{} not applied, nothing to reverse", patch.id);
                return Ok(ReverseOutcome::NotApplied);
            }
        }

        match self.tree.apply_reverse(&path) {
            PatchOutcome::Ok => {
                info!("reversed {}", patch.id);
                Ok(ReverseOutcome::Reversed)
            }
            PatchOutcome::NotFound => Err(DemoError::missing_patch(&patch.id, path)),
            PatchOutcome::Conflict => Err(DemoError::ReverseFailed {
                id: patch.id.clone(),
                message: "tree changed between check and reverse".to_string(),
            }),
            PatchOutcome::Failed(message) => Err(DemoError::ReverseFailed {
                id: patch.id.clone(),
                message,
            }),
        }
    }
}
