//! In-memory working tree.
//!
//! [`InMemoryTree`] implements [`PatchTool`], [`TreeStatus`] and
//! [`TestRunner`] over a table of fake patches, so orchestration can be
//! exercised without git or a test suite. Test commands fail exactly when the
//! patch they cover is applied, mirroring a project whose tests catch every
//! injected bug.

use crate::config::DemoSettings;
use crate::error::{DemoError, Result};
use crate::oracle::{TestOutcome, TestRunner};
use crate::registry::{PatchDescriptor, PatchRegistry, TestLayer};
use crate::tree::{PatchOutcome, PatchTool, StatusEntry, TreeStatus};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Root directory reported by [`InMemoryTree`].
pub const FAKE_ROOT: &str = "/fake/project";

/// Command the fake treats as the full test suite.
pub const FAKE_FULL_SUITE: &str = "test all";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Behavior {
    Normal,
    /// Neither direction applies.
    Conflict,
    /// Dry runs pass, real writes fail with the message.
    FailOnWrite(String),
}

#[derive(Debug, Clone)]
struct FakePatch {
    id: String,
    applied: bool,
    behavior: Behavior,
    breaks_tests: bool,
    test_command: String,
}

/// Mock working tree with controllable patches, status and tests.
///
/// # Example
///
/// ```rust,ignore
/// let patch = fake_patch("bug-01");
/// let tree = InMemoryTree::new()
///     .with_patch(&patch)
///     .with_change(" M", "src/app.js");
///
/// assert_eq!(tree.dry_run_forward(&patch.resolve(tree.root())), PatchOutcome::Ok);
/// ```
#[derive(Debug)]
pub struct InMemoryTree {
    root: PathBuf,
    changes: Vec<StatusEntry>,
    status_error: Option<String>,
    patches: RefCell<HashMap<PathBuf, FakePatch>>,
    test_overrides: HashMap<String, TestOutcome>,
    full_suite_command: String,
    mutations: RefCell<Vec<String>>,
    test_runs: RefCell<Vec<String>>,
}

impl Default for InMemoryTree {
    fn default() -> Self {
        Self {
            root: PathBuf::from(FAKE_ROOT),
            changes: Vec::new(),
            status_error: None,
            patches: RefCell::new(HashMap::new()),
            test_overrides: HashMap::new(),
            full_suite_command: FAKE_FULL_SUITE.to_string(),
            mutations: RefCell::new(Vec::new()),
            test_runs: RefCell::new(Vec::new()),
        }
    }
}

impl InMemoryTree {
    /// Create an empty, clean tree with no patch files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree holding every patch in `registry`, none applied.
    #[must_use]
    pub fn with_registry(registry: &PatchRegistry) -> Self {
        registry
            .all()
            .iter()
            .fold(Self::new(), |tree, patch| tree.with_patch(patch))
    }

    fn key(&self, patch: &PatchDescriptor) -> PathBuf {
        patch.resolve(&self.root)
    }

    fn insert(self, patch: &PatchDescriptor, behavior: Behavior) -> Self {
        let key = self.key(patch);
        self.patches.borrow_mut().insert(
            key,
            FakePatch {
                id: patch.id.clone(),
                applied: false,
                behavior,
                breaks_tests: true,
                test_command: patch.test_command.clone(),
            },
        );
        self
    }

    /// Add an uncommitted change to the status listing.
    #[must_use]
    pub fn with_change(mut self, code: &str, path: &str) -> Self {
        self.changes.push(StatusEntry::new(code, path));
        self
    }

    /// Make the status query fail.
    #[must_use]
    pub fn with_status_error(mut self, message: &str) -> Self {
        self.status_error = Some(message.to_string());
        self
    }

    /// Register a patch file that applies cleanly.
    #[must_use]
    pub fn with_patch(self, patch: &PatchDescriptor) -> Self {
        self.insert(patch, Behavior::Normal)
    }

    /// Register a patch file that conflicts in both directions.
    #[must_use]
    pub fn with_conflicting_patch(self, patch: &PatchDescriptor) -> Self {
        self.insert(patch, Behavior::Conflict)
    }

    /// Register a patch whose dry runs succeed but whose real writes fail.
    #[must_use]
    pub fn with_failing_patch(self, patch: &PatchDescriptor, message: &str) -> Self {
        self.insert(patch, Behavior::FailOnWrite(message.to_string()))
    }

    /// Register a patch that starts out applied.
    #[must_use]
    pub fn with_applied_patch(self, patch: &PatchDescriptor) -> Self {
        let tree = self.insert(patch, Behavior::Normal);
        tree.mark_applied(patch);
        tree
    }

    /// Keep tests passing even while `patch` is applied.
    #[must_use]
    pub fn with_silent_patch(self, patch: &PatchDescriptor) -> Self {
        let key = self.key(patch);
        if let Some(fake) = self.patches.borrow_mut().get_mut(&key) {
            fake.breaks_tests = false;
        }
        self
    }

    /// Force a test command to report `outcome`.
    #[must_use]
    pub fn with_test_override(mut self, command: &str, outcome: TestOutcome) -> Self {
        self.test_overrides.insert(command.to_string(), outcome);
        self
    }

    /// Flip a registered patch to applied without recording a mutation.
    pub fn mark_applied(&self, patch: &PatchDescriptor) {
        let key = self.key(patch);
        if let Some(fake) = self.patches.borrow_mut().get_mut(&key) {
            fake.applied = true;
        }
    }

    pub fn is_applied(&self, patch: &PatchDescriptor) -> bool {
        self.patches
            .borrow()
            .get(&self.key(patch))
            .is_some_and(|fake| fake.applied)
    }

    /// Successful real applies and reverses so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations.borrow().len()
    }

    /// Mutation log, e.g. `["apply bug-01", "reverse bug-01"]`.
    pub fn mutations(&self) -> Vec<String> {
        self.mutations.borrow().clone()
    }

    /// Test commands run so far, in order.
    pub fn test_runs(&self) -> Vec<String> {
        self.test_runs.borrow().clone()
    }

    fn any_breaking_applied(&self) -> bool {
        self.patches
            .borrow()
            .values()
            .any(|fake| fake.applied && fake.breaks_tests)
    }

    fn write(&self, patch: &Path, apply: bool) -> PatchOutcome {
        let mut patches = self.patches.borrow_mut();
        let Some(fake) = patches.get_mut(patch) else {
            return PatchOutcome::NotFound;
        };

        match &fake.behavior {
            Behavior::FailOnWrite(message) => return PatchOutcome::Failed(message.clone()),
            Behavior::Conflict => return PatchOutcome::Failed("patch does not apply".to_string()),
            Behavior::Normal => {}
        }
        if fake.applied == apply {
            return PatchOutcome::Failed("patch does not apply".to_string());
        }

        fake.applied = apply;
        let verb = if apply { "apply" } else { "reverse" };
        self.mutations
            .borrow_mut()
            .push(format!("{} {}", verb, fake.id));
        PatchOutcome::Ok
    }

    fn check(&self, patch: &Path, want_applied: bool) -> PatchOutcome {
        match self.patches.borrow().get(patch) {
            None => PatchOutcome::NotFound,
            Some(fake) if fake.behavior == Behavior::Conflict => PatchOutcome::Conflict,
            Some(fake) if fake.applied == want_applied => PatchOutcome::Ok,
            Some(_) => PatchOutcome::Conflict,
        }
    }
}

impl PatchTool for InMemoryTree {
    fn dry_run_forward(&self, patch: &Path) -> PatchOutcome {
        self.check(patch, false)
    }

    fn dry_run_reverse(&self, patch: &Path) -> PatchOutcome {
        self.check(patch, true)
    }

    fn apply_forward(&self, patch: &Path) -> PatchOutcome {
        self.write(patch, true)
    }

    fn apply_reverse(&self, patch: &Path) -> PatchOutcome {
        self.write(patch, false)
    }
}

impl TreeStatus for InMemoryTree {
    fn changes(&self) -> Result<Vec<StatusEntry>> {
        match &self.status_error {
            Some(message) => Err(DemoError::git("status", message.clone())),
            None => Ok(self.changes.clone()),
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

impl TestRunner for InMemoryTree {
    fn run(&self, command: &str) -> TestOutcome {
        self.test_runs.borrow_mut().push(command.to_string());

        if let Some(outcome) = self.test_overrides.get(command) {
            return *outcome;
        }
        if command == self.full_suite_command {
            return TestOutcome::from_success(!self.any_breaking_applied());
        }

        let caught = self
            .patches
            .borrow()
            .values()
            .any(|fake| fake.test_command == command && fake.applied && fake.breaks_tests);
        TestOutcome::from_success(!caught)
    }
}

// ============================================================================
// Builders
// ============================================================================

/// A bug patch at `patches/<id>.patch` tested by `test <id>`.
pub fn fake_patch(id: &str) -> PatchDescriptor {
    PatchDescriptor::bug(
        id,
        format!("Fake {}", id),
        format!("patches/{}.patch", id),
        format!("test {}", id),
        TestLayer::Unit,
    )
    .with_description(format!("Introduces {}", id))
    .with_takeaway(format!("Unit test caught {}", id))
}

/// A feature-removal patch with the same layout as [`fake_patch`].
pub fn fake_feature(id: &str) -> PatchDescriptor {
    fake_patch(id).as_feature()
}

/// Four fake bugs plus `feature-search`, mirroring the built-in registry.
///
/// # Panics
///
/// Panics if the registry rejects the fixed ids.
pub fn fake_registry() -> PatchRegistry {
    let mut patches: Vec<PatchDescriptor> = ["bug-01", "bug-02", "bug-03", "bug-04"]
        .iter()
        .map(|id| fake_patch(id))
        .collect();
    patches.push(fake_feature("feature-search"));
    match PatchRegistry::new(patches) {
        Ok(registry) => registry,
        Err(e) => panic!("fake registry rejected: {}", e),
    }
}

/// Settings whose full suite is [`FAKE_FULL_SUITE`].
pub fn fake_settings() -> DemoSettings {
    DemoSettings::default().with_full_test_command(FAKE_FULL_SUITE)
}
