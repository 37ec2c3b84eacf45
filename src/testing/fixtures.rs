//! Test fixtures for creating reproducible git working trees.
//!
//! [`GitFixture`] builds a throwaway repository with four "bug" files, one
//! "feature" file and a committed patch for each. Every bug test is a `grep`
//! that fails once its patch is applied, so the real git path can be driven
//! end to end without a JavaScript toolchain.

use crate::config::DemoSettings;
use crate::registry::{PatchDescriptor, PatchRegistry, TestLayer};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Ids of the bug patches the fixture ships.
pub const FIXTURE_BUGS: [&str; 4] = ["bug-01", "bug-02", "bug-03", "bug-04"];

/// A temporary git repository with demo patches committed.
///
/// Automatically cleans up when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = GitFixture::new();
/// let repo = GitRepo::new(fixture.path());
/// let patch = fixture.bug_patch("bug-01");
/// assert_eq!(repo.dry_run_forward(&patch), PatchOutcome::Ok);
/// ```
pub struct GitFixture {
    temp_dir: TempDir,
}

impl GitFixture {
    /// Create and commit the fixture repository.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created or git fails.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fixture = Self { temp_dir };

        for id in FIXTURE_BUGS {
            fixture.write(&format!("src/{}.txt", id), "ok\n");
            fixture.write(
                &format!("patches/{}.patch", id),
                &Self::replace_line_patch(&format!("src/{}.txt", id), "ok", "broken"),
            );
        }
        fixture.write("src/search.txt", "search\n");
        fixture.write(
            "patches/feature-search.patch",
            &Self::replace_line_patch("src/search.txt", "search", "removed"),
        );

        fixture.git(&["init", "--quiet"]);
        fixture.git(&["config", "user.email", "test@example.com"]);
        fixture.git(&["config", "user.name", "Test User"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture.commit_all("Initial commit");

        fixture
    }

    /// Unified diff turning the single line `from` into `to`.
    fn replace_line_patch(file: &str, from: &str, to: &str) -> String {
        format!(
            "diff --git a/{file} b/{file}\n\
             --- a/{file}\n\
             +++ b/{file}\n\
             @@ -1 +1 @@\n\
             -{from}\n\
             +{to}\n"
        )
    }

    fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.temp_dir.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Stage and commit everything.
    ///
    /// # Panics
    ///
    /// Panics if git fails.
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "."]);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    /// Get the path to the fixture directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of the patch for `id`.
    #[must_use]
    pub fn bug_patch(&self, id: &str) -> PathBuf {
        self.temp_dir.path().join(format!("patches/{}.patch", id))
    }

    /// Write a file, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, relative_path: &str, content: &str) {
        let path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Read a file from the fixture directory.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read(&self, relative_path: &str) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(relative_path))
            .expect("Failed to read file")
    }

    /// Registry matching the committed patches.
    ///
    /// # Panics
    ///
    /// Panics if the registry is rejected.
    #[must_use]
    pub fn registry(&self) -> PatchRegistry {
        let mut patches: Vec<PatchDescriptor> = FIXTURE_BUGS
            .iter()
            .map(|id| {
                PatchDescriptor::bug(
                    *id,
                    format!("Fixture {}", id),
                    format!("patches/{}.patch", id),
                    format!("grep -qx ok src/{}.txt", id),
                    TestLayer::Unit,
                )
                .with_takeaway(format!("grep caught {}", id))
            })
            .collect();
        patches.push(
            PatchDescriptor::bug(
                "feature-search",
                "Search Filter",
                "patches/feature-search.patch",
                "grep -qx search src/search.txt",
                TestLayer::E2e,
            )
            .as_feature(),
        );
        PatchRegistry::new(patches).expect("Fixture registry is valid")
    }

    /// Full-suite command: passes iff no bug is active and search exists.
    #[must_use]
    pub fn full_suite_command() -> &'static str {
        "! grep -rqx broken src && grep -qx search src/search.txt"
    }

    /// Settings wired to [`Self::full_suite_command`].
    #[must_use]
    pub fn settings(&self) -> DemoSettings {
        DemoSettings::default().with_full_test_command(Self::full_suite_command())
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}
