//! Scenario orchestration.
//!
//! The [`Orchestrator`] sequences registry entries through the inspector,
//! applier and test oracle. A run moves through
//! `CheckingCleanliness → VerifyingPatchFiles → Processing(patch[i]) →
//! Summarizing`. A clean-check failure, a missing patch file or a failed
//! real apply stops the run with an error; conflicts and unexpected test
//! outcomes are recorded and the run continues.
//!
//! # Example
//!
//! ```rust,ignore
//! use patchdemo::{DemoConfig, GitRepo, Orchestrator, Reporter, ShellTestRunner};
//!
//! let config = DemoConfig::load(".".as_ref())?;
//! let registry = config.registry()?;
//! let settings = config.settings();
//! let repo = GitRepo::new(".");
//! let runner = ShellTestRunner::new(".");
//!
//! let mut orchestrator = Orchestrator::new(&registry, &settings, &repo, &runner, Reporter::stdout());
//! let summary = orchestrator.setup_broken()?;
//! std::process::exit(summary.exit_code());
//! ```

pub mod summary;

pub use summary::{
    Action, Operation, Outcome, PatchStatus, RunSummary, ScenarioResult, StatusReport, TestStatus,
};

use crate::config::DemoSettings;
use crate::error::{DemoError, Result};
use crate::oracle::{describe_mismatch, verify_expectation, TestOutcome, TestRunner, Verdict};
use crate::registry::{PatchDescriptor, PatchRegistry};
use crate::report::Reporter;
use crate::tree::{ApplyOutcome, PatchApplier, ReverseOutcome, TreeInspector, Workspace};
use tracing::{debug, info};

/// Phase of a run, logged as the orchestrator advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    CheckingCleanliness,
    VerifyingPatchFiles,
    Processing(usize),
    Summarizing,
    Done,
}

/// Drives the demo operations against one working tree.
pub struct Orchestrator<'a> {
    registry: &'a PatchRegistry,
    settings: &'a DemoSettings,
    tree: &'a dyn Workspace,
    runner: &'a dyn TestRunner,
    reporter: Reporter,
    phase: RunPhase,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        registry: &'a PatchRegistry,
        settings: &'a DemoSettings,
        tree: &'a dyn Workspace,
        runner: &'a dyn TestRunner,
        reporter: Reporter,
    ) -> Self {
        Self {
            registry,
            settings,
            tree,
            runner,
            reporter,
            phase: RunPhase::Init,
        }
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn inspector(&self) -> TreeInspector<'a> {
        TreeInspector::new(self.tree)
    }

    fn applier(&self) -> PatchApplier<'a> {
        PatchApplier::new(self.tree)
    }

    // ------------------------------------------------------------------------
    // Shared steps
    // ------------------------------------------------------------------------

    /// Print a fatal error with its details and hand it back.
    fn report_fatal(&mut self, err: DemoError) -> DemoError {
        self.reporter.blank();
        match &err {
            DemoError::DirtyTree { changes } => {
                self.reporter.error("Working directory has uncommitted changes:");
                for change in changes {
                    self.reporter.detail(change);
                }
            }
            DemoError::Git { .. } => {
                self.reporter.error("Could not check git status");
                self.reporter.detail(&err.to_string());
            }
            other => self.reporter.error(&other.to_string()),
        }
        if let Some(hint) = err.hint() {
            self.reporter.blank();
            self.reporter.line(hint);
        }
        self.reporter.blank();
        err
    }

    fn require_clean(&mut self) -> Result<()> {
        self.enter(RunPhase::CheckingCleanliness);
        let report = self.inspector().check_clean(&self.settings.ignore_paths)?;

        if !report.is_clean() {
            return Err(DemoError::DirtyTree {
                changes: report.relevant.iter().map(ToString::to_string).collect(),
            });
        }
        Ok(())
    }

    fn verify_patch_files(&mut self, patches: &[&PatchDescriptor]) -> Result<()> {
        self.enter(RunPhase::VerifyingPatchFiles);
        let inspector = self.inspector();

        for patch in patches {
            if !inspector.patch_exists(patch) {
                return Err(DemoError::missing_patch(
                    &patch.id,
                    patch.resolve(self.tree.root()),
                ));
            }
        }
        Ok(())
    }

    /// Run a patch's test and compare against `expected`.
    fn run_patch_test(
        &mut self,
        patch: &PatchDescriptor,
        expected: TestOutcome,
    ) -> (TestOutcome, Verdict) {
        self.reporter.blank();
        self.reporter.line(format!(
            "  Running {} tests: {}",
            patch.test_layer, patch.test_command
        ));
        self.reporter.blank();

        let actual = self.runner.run(&patch.test_command);
        let verdict = verify_expectation(actual, expected);
        info!(
            "{} test {} (expected {}): {:?}",
            patch.id, actual, expected, verdict
        );

        self.reporter.blank();
        match describe_mismatch(actual, expected) {
            None if expected == TestOutcome::Failed => {
                self.reporter.ok("Tests failed as expected - bug is active.");
            }
            None => self.reporter.ok("Tests passed as expected."),
            Some(message) => self.reporter.warning(message),
        }

        (actual, verdict)
    }

    fn run_full_suite(&mut self) -> TestOutcome {
        let command = self.settings.full_test_command.clone();
        debug!("running full suite: {}", command);
        let outcome = self.runner.run(&command);
        info!("full suite {}", outcome);
        outcome
    }

    fn bugs(&self) -> Vec<&'a PatchDescriptor> {
        self.registry.bugs().collect()
    }

    // ------------------------------------------------------------------------
    // Setup-Broken
    // ------------------------------------------------------------------------

    /// Apply every bug patch. Succeeds iff at least one bug ends up active.
    ///
    /// # Errors
    ///
    /// Fatal on a dirty tree, a missing patch file, or a failed real apply.
    pub fn setup_broken(&mut self) -> Result<RunSummary> {
        let result = self.setup_broken_inner();
        self.enter(RunPhase::Done);
        result.map_err(|e| self.report_fatal(e))
    }

    fn setup_broken_inner(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::start(Operation::SetupBroken);
        let bugs = self.bugs();
        let total = bugs.len();

        self.reporter.blank();
        self.reporter.header("DEMO SETUP: Multi-Bug Broken State");
        self.reporter.blank();
        self.reporter.line(format!(
            "This will introduce all {} bugs for the demo presentation.",
            total
        ));

        self.reporter.step(1, 3, "Checking working directory...");
        self.require_clean()?;
        self.reporter.detail("  Working directory is clean.");

        self.reporter.step(2, 3, "Verifying patch files exist...");
        self.verify_patch_files(&bugs)?;
        self.reporter
            .detail(&format!("  All {} patch files found.", total));

        self.reporter.step(3, 3, "Applying bug patches...");
        self.reporter.blank();
        let bar = self.reporter.progress_bar(total, "Applying");
        let applier = self.applier();

        for (index, patch) in bugs.iter().enumerate() {
            self.enter(RunPhase::Processing(index));
            let outcome = match applier.apply(patch) {
                Ok(outcome) => outcome,
                Err(e) => {
                    bar.finish_and_clear();
                    return Err(e);
                }
            };

            let recorded = match outcome {
                ApplyOutcome::AlreadyApplied => {
                    bar.suspend(|| {
                        self.reporter
                            .item('~', &format!("{}: Already applied", patch.display_name))
                    });
                    Outcome::AlreadyInState
                }
                ApplyOutcome::Conflict => {
                    bar.suspend(|| {
                        self.reporter.item(
                            '!',
                            &format!(
                                "{}: Skipped (patch conflicts with current code)",
                                patch.display_name
                            ),
                        )
                    });
                    Outcome::Conflict
                }
                ApplyOutcome::Applied => {
                    bar.suspend(|| {
                        self.reporter
                            .item('+', &format!("{}: Applied", patch.display_name))
                    });
                    Outcome::Success
                }
            };
            summary.record(ScenarioResult::new(&patch.id, Action::Apply, recorded));
            bar.inc(1);
        }
        bar.finish_and_clear();

        self.enter(RunPhase::Summarizing);
        let applied = summary.count(Outcome::Success);
        let already = summary.count(Outcome::AlreadyInState);
        let active = applied + already;
        let skipped: Vec<String> = summary
            .results
            .iter()
            .filter(|r| r.outcome == Outcome::Conflict)
            .filter_map(|r| self.registry.get(&r.patch_id))
            .map(|p| p.display_name.clone())
            .collect();

        self.reporter.blank();
        self.reporter.header("SETUP COMPLETE");
        self.reporter.blank();

        if active == 0 {
            self.reporter.warning("No bugs could be applied.");
            self.reporter
                .detail("Check that patches match the current codebase.");
            return Ok(summary.finish(false));
        } else if active == total {
            self.reporter
                .ok(&format!("Demo state: BROKEN ({} bugs active)", total));
            if already > 0 {
                self.reporter.detail(&format!(
                    " {} applied, {} already active.",
                    applied, already
                ));
            }
        } else {
            self.reporter.ok(&format!(
                "Demo state: BROKEN ({} of {} bugs active)",
                active, total
            ));
            self.reporter.detail(&format!(
                " Applied: {}, Already active: {}",
                applied, already
            ));
            if !skipped.is_empty() {
                self.reporter
                    .detail(&format!(" Skipped: {}", skipped.join(", ")));
            }
        }

        self.reporter.blank();
        self.reporter.line(
            "Expected: Tests will fail across unit, integration, and E2E layers.",
        );
        self.reporter.footer(&["To restore: patchdemo reset"]);

        Ok(summary.finish(true))
    }

    // ------------------------------------------------------------------------
    // Toggle-Bug
    // ------------------------------------------------------------------------

    /// Flip one patch: reverse it if applied, apply it otherwise, then check
    /// that its test responds. A test mismatch is a warning only.
    ///
    /// # Errors
    ///
    /// Fatal on an unknown id, a missing patch file, a conflict, or a failed
    /// real apply or reverse.
    pub fn toggle(&mut self, id: &str) -> Result<RunSummary> {
        let result = self.toggle_inner(id);
        self.enter(RunPhase::Done);
        result.map_err(|e| self.report_fatal(e))
    }

    fn toggle_inner(&mut self, id: &str) -> Result<RunSummary> {
        let mut summary = RunSummary::start(Operation::ToggleBug);
        let registry = self.registry;
        let patch = registry.require(id)?;

        self.reporter.blank();
        self.reporter
            .header(&format!("BUG TOGGLE: {}", patch.display_name));
        self.reporter.blank();
        if !patch.description.is_empty() {
            self.reporter
                .line(format!("Description: {}", patch.description));
        }
        self.reporter.line(format!("Bug ID: {}", patch.id));

        self.verify_patch_files(&[patch])?;
        self.enter(RunPhase::Processing(0));
        let applier = self.applier();

        let result = if self.inspector().is_patch_applied(patch) {
            self.reporter.blank();
            self.reporter.line("[STATE] Bug is currently ACTIVE");
            self.reporter
                .line("[ACTION] Removing bug (reverting patch)...");

            let outcome = match applier.reverse(patch)? {
                ReverseOutcome::Reversed => {
                    self.reporter.blank();
                    self.reporter.detail("Patch reversed successfully.");
                    Outcome::Success
                }
                ReverseOutcome::NotApplied => Outcome::AlreadyInState,
            };

            self.reporter.blank();
            self.reporter.line("[VERIFY] Checking that tests now PASS...");
            let (actual, verdict) = self.run_patch_test(patch, TestOutcome::Passed);
            ScenarioResult::new(&patch.id, Action::Reverse, outcome).with_test(actual, verdict)
        } else {
            self.reporter.blank();
            self.reporter.line("[STATE] Bug is currently NOT ACTIVE");

            let outcome = match applier.apply(patch)? {
                ApplyOutcome::Conflict => {
                    return Err(DemoError::Conflict {
                        id: patch.id.clone(),
                    })
                }
                ApplyOutcome::AlreadyApplied => Outcome::AlreadyInState,
                ApplyOutcome::Applied => {
                    self.reporter
                        .line("[ACTION] Introducing bug (applying patch)...");
                    self.reporter.blank();
                    self.reporter.detail("Patch applied successfully.");
                    Outcome::Success
                }
            };

            self.reporter.blank();
            self.reporter
                .line("[VERIFY] Checking that tests now FAIL (as expected)...");
            let (actual, verdict) = self.run_patch_test(patch, TestOutcome::Failed);
            ScenarioResult::new(&patch.id, Action::Apply, outcome).with_test(actual, verdict)
        };

        self.enter(RunPhase::Summarizing);
        self.reporter.blank();
        self.reporter.header("TOGGLE COMPLETE");
        self.reporter.blank();

        let matched = result.verdict == Some(Verdict::Matches);
        match (result.action, matched) {
            (Action::Reverse, true) => self.reporter.ok("Bug removed - tests are passing."),
            (Action::Reverse, false) => {
                self.reporter.warning("Bug removed but tests still failing.");
                self.reporter.detail("Other issues may exist in codebase.");
            }
            (Action::Apply, true) => self
                .reporter
                .ok("Bug introduced - tests are failing as expected."),
            (Action::Apply, false) => {
                self.reporter
                    .warning("Bug introduced but tests passed unexpectedly.");
                self.reporter.detail("The bug may not affect test coverage.");
            }
        }
        summary.record(result);

        self.reporter
            .footer(&["To reset all demo state: patchdemo reset"]);
        Ok(summary.finish(true))
    }

    // ------------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------------

    /// Reverse every applied patch in the registry, newest first, then run
    /// the full suite. Succeeds iff nothing was applied or the suite passes.
    ///
    /// # Errors
    ///
    /// Fatal if a detected patch fails to reverse.
    pub fn reset(&mut self) -> Result<RunSummary> {
        let result = self.reset_inner();
        self.enter(RunPhase::Done);
        result.map_err(|e| self.report_fatal(e))
    }

    fn reset_inner(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::start(Operation::Reset);

        self.reporter.blank();
        self.reporter.header("DEMO RESET: Restoring Clean State");
        self.reporter.blank();
        self.reporter
            .line("This will detect and reverse any applied demo patches.");

        self.reporter.step(1, 3, "Detecting applied patches...");
        self.reporter.blank();
        let inspector = self.inspector();
        let registry = self.registry;
        let mut applied = Vec::new();
        for patch in registry.all() {
            if inspector.is_patch_applied(patch) {
                self.reporter.item('X', &patch.display_name);
                applied.push(patch);
            } else {
                self.reporter.item(' ', &patch.display_name);
            }
        }

        if applied.is_empty() {
            self.enter(RunPhase::Summarizing);
            self.reporter.blank();
            self.reporter.header("RESET COMPLETE");
            self.reporter.blank();
            self.reporter
                .ok("Already in clean state - no patches applied.");
            self.print_setup_commands();
            return Ok(summary.finish(true));
        }

        self.reporter.step(
            2,
            3,
            &format!("Reversing {} patch(es)...", applied.len()),
        );
        self.reporter.blank();
        let bar = self.reporter.progress_bar(applied.len(), "Reversing");
        let applier = self.applier();

        for (index, patch) in applied.iter().rev().enumerate() {
            self.enter(RunPhase::Processing(index));
            let outcome = match applier.reverse(patch) {
                Ok(outcome) => outcome,
                Err(e) => {
                    bar.finish_and_clear();
                    return Err(e);
                }
            };
            let recorded = match outcome {
                ReverseOutcome::Reversed => {
                    bar.suspend(|| {
                        self.reporter
                            .ok_item(&format!("Reversed: {}", patch.display_name))
                    });
                    Outcome::Success
                }
                ReverseOutcome::NotApplied => {
                    bar.suspend(|| {
                        self.reporter
                            .item('-', &format!("{}: no longer applied", patch.display_name))
                    });
                    Outcome::AlreadyInState
                }
            };
            summary.record(ScenarioResult::new(&patch.id, Action::Reverse, recorded));
            bar.inc(1);
        }
        bar.finish_and_clear();

        self.reporter
            .step(3, 3, "Validating clean state with test suite...");
        self.reporter.blank();
        let suite = self.run_full_suite();
        summary.suite_outcome = Some(suite);

        self.enter(RunPhase::Summarizing);
        self.reporter.blank();
        self.reporter.header("RESET COMPLETE");
        self.reporter.blank();

        if suite == TestOutcome::Passed {
            self.reporter
                .ok("All tests passing - clean state restored successfully!");
            self.print_setup_commands();
            Ok(summary.finish(true))
        } else {
            self.reporter.warning("Some tests are still failing.");
            self.reporter
                .detail("Check git status for uncommitted changes.");
            self.reporter.detail("Manual intervention may be required.");
            self.reporter.blank();
            Ok(summary.finish(false))
        }
    }

    fn print_setup_commands(&mut self) {
        self.reporter.footer(&[
            "Available setup commands:",
            "  patchdemo setup-broken     - Apply all bugs",
            "  patchdemo setup-no-filter  - Remove search filter",
        ]);
    }

    // ------------------------------------------------------------------------
    // Fix
    // ------------------------------------------------------------------------

    /// Reverse the bug patches, newest first, then run the full suite.
    ///
    /// # Errors
    ///
    /// Fatal on a missing patch file or a failed real reverse.
    pub fn fix(&mut self) -> Result<RunSummary> {
        let result = self.fix_inner();
        self.enter(RunPhase::Done);
        result.map_err(|e| self.report_fatal(e))
    }

    fn fix_inner(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::start(Operation::Fix);

        self.reporter.blank();
        self.reporter.header("RESTORING: Reversing all demo patches");

        let bugs = self.bugs();
        self.verify_patch_files(&bugs)?;

        let applier = self.applier();
        for (index, patch) in bugs.into_iter().rev().enumerate() {
            self.enter(RunPhase::Processing(index));
            self.reporter.blank();
            self.reporter
                .line(format!("Reversing: {}", patch.file_path.display()));

            let recorded = match applier.reverse(patch)? {
                ReverseOutcome::Reversed => {
                    self.reporter.ok("Reversed successfully.");
                    Outcome::Success
                }
                ReverseOutcome::NotApplied => {
                    self.reporter.line("[--] Patch not applied, skipping.");
                    Outcome::AlreadyInState
                }
            };
            summary.record(ScenarioResult::new(&patch.id, Action::Reverse, recorded));
        }

        self.reporter
            .subheader("Running full test suite to verify restoration...");
        self.reporter.blank();
        let suite = self.run_full_suite();
        summary.suite_outcome = Some(suite);

        self.enter(RunPhase::Summarizing);
        self.reporter.blank();
        self.reporter.header("RESTORE COMPLETE");
        self.reporter.blank();

        if suite == TestOutcome::Passed {
            self.reporter
                .ok("All tests passing - code restored successfully!");
            self.reporter.blank();
            self.reporter.line(
                "The demo showed how tests catch bugs before they reach production.",
            );
            self.reporter.blank();
            Ok(summary.finish(true))
        } else {
            self.reporter.warning("Some tests are still failing.");
            self.reporter.detail(
                "This may indicate additional patches need reversal or other issues.",
            );
            self.reporter
                .detail("Check git status and consider: git checkout -- <file>");
            self.reporter.blank();
            Ok(summary.finish(false))
        }
    }

    // ------------------------------------------------------------------------
    // Guided demo
    // ------------------------------------------------------------------------

    /// Break-then-fix walkthrough: apply each bug, require its test to fail.
    /// Succeeds iff every bug was applied and caught.
    ///
    /// # Errors
    ///
    /// Fatal on a dirty tree, a missing patch file, or a failed real apply.
    pub fn guided_demo(&mut self) -> Result<RunSummary> {
        let result = self.guided_demo_inner();
        self.enter(RunPhase::Done);
        result.map_err(|e| self.report_fatal(e))
    }

    fn guided_demo_inner(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::start(Operation::GuidedDemo);
        let scenarios = self.bugs();
        let total = scenarios.len();

        self.reporter.blank();
        self.reporter.header("DEMO: Break-Then-Fix Testing Scenarios");
        self.reporter.blank();
        self.reporter.line(format!(
            "This demo introduces {} real bugs and shows how different",
            total
        ));
        self.reporter
            .line("test types (unit, integration, E2E) catch them immediately.");

        self.reporter.blank();
        self.reporter.line("Checking working directory...");
        self.require_clean()?;
        self.reporter.ok("Working directory is clean.");

        self.reporter.blank();
        self.reporter.line("Verifying patch files exist...");
        self.verify_patch_files(&scenarios)?;
        self.reporter
            .ok(&format!("All {} patch files found.", total));

        let applier = self.applier();
        let mut caught = 0;

        for (index, patch) in scenarios.iter().enumerate() {
            self.enter(RunPhase::Processing(index));
            self.reporter.subheader(&format!(
                "SCENARIO {}: {}",
                index + 1,
                patch.display_name
            ));
            self.reporter.blank();
            if !patch.description.is_empty() {
                self.reporter
                    .line(format!("Introducing bug: {}", patch.description));
            }
            self.reporter
                .line(format!("Patch: {}", patch.file_path.display()));

            let outcome = match applier.apply(patch)? {
                ApplyOutcome::Applied => {
                    self.reporter.ok("Patch applied successfully.");
                    Outcome::Success
                }
                ApplyOutcome::AlreadyApplied => {
                    self.reporter.ok("Patch already applied.");
                    Outcome::AlreadyInState
                }
                ApplyOutcome::Conflict => {
                    self.reporter
                        .error("Failed to apply patch (conflicts with current code)");
                    summary.record(ScenarioResult::new(
                        &patch.id,
                        Action::Apply,
                        Outcome::Conflict,
                    ));
                    continue;
                }
            };

            self.reporter.blank();
            self.reporter.line(format!(
                "Running {} tests: {}",
                patch.test_layer, patch.test_command
            ));
            self.reporter.blank();
            let actual = self.runner.run(&patch.test_command);
            let verdict = verify_expectation(actual, TestOutcome::Failed);

            self.reporter.blank();
            if verdict == Verdict::Matches {
                caught += 1;
                self.reporter
                    .ok("RESULT: Tests FAILED as expected - bug was caught!");
                if let Some(takeaway) = &patch.takeaway {
                    self.reporter
                        .detail(&format!("Key takeaway: {}", takeaway));
                }
            } else {
                self.reporter
                    .warning("UNEXPECTED: Tests passed (bug was not detected)");
            }
            summary.record(
                ScenarioResult::new(&patch.id, Action::Apply, outcome).with_test(actual, verdict),
            );
        }

        self.enter(RunPhase::Summarizing);
        self.reporter.blank();
        self.reporter.header("DEMO COMPLETE");
        self.reporter.blank();

        let failing = summary.failing_ids().join(", ");
        let success = total > 0 && caught == total;
        if total == 0 {
            self.reporter.warning("No bug scenarios are registered.");
        } else if success {
            self.reporter.ok(&format!(
                "All {} bugs introduced and caught by tests!",
                total
            ));
            self.reporter.blank();
            self.reporter.line(
                "Key insight: These bugs would have reached production without tests.",
            );
        } else {
            self.reporter.warning(&format!(
                "{}/{} scenarios completed successfully.",
                caught, total
            ));
            self.reporter
                .detail(&format!("Failed scenarios: {}", failing));
        }

        self.reporter
            .footer(&["To restore working code, run: patchdemo fix"]);

        Ok(summary.finish(success))
    }

    // ------------------------------------------------------------------------
    // Remove-Feature
    // ------------------------------------------------------------------------

    /// Apply a feature-removal patch for a TDD walkthrough. `None` uses the
    /// configured default feature.
    ///
    /// # Errors
    ///
    /// Fatal on a dirty tree, an unknown id, a missing file, a conflict or a
    /// failed real apply.
    pub fn remove_feature(&mut self, id: Option<&str>) -> Result<RunSummary> {
        let result = self.remove_feature_inner(id);
        self.enter(RunPhase::Done);
        result.map_err(|e| self.report_fatal(e))
    }

    fn remove_feature_inner(&mut self, id: Option<&str>) -> Result<RunSummary> {
        let mut summary = RunSummary::start(Operation::RemoveFeature);
        let (registry, settings) = (self.registry, self.settings);
        let id = id.unwrap_or(settings.default_feature.as_str());
        let patch = registry.require(id)?;
        if patch.is_bug() {
            return Err(DemoError::NotAFeature { id: patch.id.clone() });
        }

        self.reporter.blank();
        self.reporter
            .header(&format!("DEMO SETUP: Feature Removed ({})", patch.display_name));
        if !patch.description.is_empty() {
            self.reporter.blank();
            self.reporter.line(&patch.description);
        }

        self.reporter.step(1, 3, "Checking working directory...");
        self.require_clean()?;
        self.reporter.detail("  Working directory is clean.");

        self.reporter.step(2, 3, "Verifying patch file exists...");
        self.verify_patch_files(&[patch])?;
        self.reporter.detail("  Patch file found.");

        self.reporter.step(3, 3, "Applying feature removal patch...");
        self.enter(RunPhase::Processing(0));
        self.reporter.blank();
        let recorded = match self.applier().apply(patch)? {
            ApplyOutcome::AlreadyApplied => {
                self.reporter
                    .item('~', &format!("{}: Already removed", patch.display_name));
                Outcome::AlreadyInState
            }
            ApplyOutcome::Applied => {
                self.reporter
                    .item('+', &format!("{}: Removed", patch.display_name));
                Outcome::Success
            }
            ApplyOutcome::Conflict => {
                return Err(DemoError::Conflict {
                    id: patch.id.clone(),
                })
            }
        };
        summary.record(ScenarioResult::new(&patch.id, Action::Apply, recorded));

        self.enter(RunPhase::Summarizing);
        self.reporter.blank();
        self.reporter.header("SETUP COMPLETE");
        self.reporter.blank();
        self.reporter.ok("Demo state: FEATURE REMOVED");
        self.reporter.blank();
        self.reporter
            .line("Purpose: TDD demonstration - rebuild the feature with tests.");
        self.reporter.footer(&["To restore: patchdemo reset"]);

        Ok(summary.finish(true))
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Report the state of every registered patch without mutating anything.
    pub fn status(&mut self) -> StatusReport {
        let inspector = self.inspector();
        let patches: Vec<PatchStatus> = self
            .registry
            .all()
            .iter()
            .map(|patch| PatchStatus {
                id: patch.id.clone(),
                name: patch.display_name.clone(),
                layer: patch.test_layer.to_string(),
                bug: patch.is_bug(),
                state: inspector.state(patch),
            })
            .collect();

        self.reporter.blank();
        self.reporter.header("DEMO STATUS");
        self.reporter.blank();
        for status in &patches {
            let marker = match status.state {
                crate::tree::PatchState::Applied => 'X',
                crate::tree::PatchState::NotApplied => ' ',
                crate::tree::PatchState::Conflict => '!',
                crate::tree::PatchState::Missing => '?',
            };
            self.reporter.item(
                marker,
                &format!(
                    "{:<16} {:<12} {} ({})",
                    status.id, status.layer, status.name, status.state
                ),
            );
        }
        self.reporter.blank();

        StatusReport { patches }
    }
}
