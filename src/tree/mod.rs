//! Working tree access: the patch tool seam, read-only inspection and
//! patch application.

pub mod applier;
pub mod inspector;
pub mod tool;

pub use applier::{ApplyOutcome, PatchApplier, ReverseOutcome};
pub use inspector::{CleanReport, PatchState, TreeInspector};
pub use tool::{Direction, GitRepo, PatchOutcome, PatchTool, StatusEntry, TreeStatus, Workspace};
