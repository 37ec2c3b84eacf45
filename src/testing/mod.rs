//! Testing infrastructure for patchdemo.
//!
//! Orchestration talks to the working tree through the [`PatchTool`] and
//! [`TreeStatus`] traits and to the test suite through [`TestRunner`]. This
//! module provides doubles for all three:
//! - **Mocks**: [`InMemoryTree`], a fake tree whose tests fail while the
//!   patch they cover is applied
//! - **Fixtures**: a real git repository with committed patches (test-only)
//! - **Assertions**: checks over [`crate::orchestrator::RunSummary`]
//!
//! # Example
//!
//! ```rust,ignore
//! use patchdemo::testing::{fake_registry, fake_settings, InMemoryTree};
//!
//! let registry = fake_registry();
//! let tree = InMemoryTree::with_registry(&registry);
//! let settings = fake_settings();
//! let mut orchestrator = Orchestrator::new(&registry, &settings, &tree, &tree, Reporter::sink());
//! ```

pub mod assertions;
#[cfg(test)]
pub mod fixtures;
pub mod mocks;

pub use crate::oracle::TestRunner;
pub use crate::tree::{PatchTool, TreeStatus};
pub use assertions::*;
#[cfg(test)]
pub use fixtures::*;
pub use mocks::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{GitRepo, PatchOutcome};

    #[test]
    fn test_fixture_starts_clean() {
        let fixture = GitFixture::new();
        let repo = GitRepo::new(fixture.path());
        assert!(repo.changes().unwrap().is_empty());
        assert_eq!(fixture.read("src/bug-01.txt"), "ok\n");
    }

    #[test]
    fn test_fixture_patches_apply() {
        let fixture = GitFixture::new();
        let repo = GitRepo::new(fixture.path());
        for patch in fixture.registry().all() {
            assert_eq!(
                repo.dry_run_forward(&patch.resolve(fixture.path())),
                PatchOutcome::Ok,
                "{} should apply",
                patch.id
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_fixture_commands_reflect_tree() {
        use crate::oracle::{ShellTestRunner, TestOutcome};

        let fixture = GitFixture::new();
        let runner = ShellTestRunner::new(fixture.path()).quiet();
        assert_eq!(runner.run(GitFixture::full_suite_command()), TestOutcome::Passed);
        assert_eq!(runner.run("grep -qx ok src/bug-01.txt"), TestOutcome::Passed);

        fixture.write("src/bug-01.txt", "broken\n");
        assert_eq!(runner.run(GitFixture::full_suite_command()), TestOutcome::Failed);
        assert_eq!(runner.run("grep -qx ok src/bug-01.txt"), TestOutcome::Failed);
    }
}
