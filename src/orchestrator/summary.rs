//! Per-run results.
//!
//! A [`RunSummary`] lives for one invocation. Nothing here is persisted:
//! the next run re-derives patch state from the working tree.

use crate::oracle::{TestOutcome, Verdict};
use crate::tree::PatchState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The public operation a summary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    SetupBroken,
    ToggleBug,
    Reset,
    Fix,
    GuidedDemo,
    RemoveFeature,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SetupBroken => "setup-broken",
            Self::ToggleBug => "bug",
            Self::Reset => "reset",
            Self::Fix => "fix",
            Self::GuidedDemo => "break",
            Self::RemoveFeature => "setup-no-filter",
        };
        f.write_str(name)
    }
}

/// What the orchestrator tried to do with a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Apply,
    Reverse,
}

/// How the tree mutation went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    AlreadyInState,
    Conflict,
    Failed,
}

/// Test result attached to a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl From<TestOutcome> for TestStatus {
    fn from(outcome: TestOutcome) -> Self {
        match outcome {
            TestOutcome::Passed => Self::Passed,
            TestOutcome::Failed => Self::Failed,
        }
    }
}

/// Result for one patch in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    pub patch_id: String,
    pub action: Action,
    pub outcome: Outcome,
    pub test_outcome: TestStatus,
    /// Present when a test ran against an expectation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

impl ScenarioResult {
    pub fn new(patch_id: impl Into<String>, action: Action, outcome: Outcome) -> Self {
        Self {
            patch_id: patch_id.into(),
            action,
            outcome,
            test_outcome: TestStatus::Skipped,
            verdict: None,
        }
    }

    #[must_use]
    pub fn with_test(mut self, outcome: TestOutcome, verdict: Verdict) -> Self {
        self.test_outcome = outcome.into();
        self.verdict = Some(verdict);
        self
    }

    /// Conflict, failure, or a test result that contradicts the expectation.
    pub fn is_unexpected(&self) -> bool {
        matches!(self.outcome, Outcome::Conflict | Outcome::Failed)
            || self.verdict == Some(Verdict::Unexpected)
    }
}

/// Aggregated results of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub operation: Operation,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Vec<ScenarioResult>,
    /// Outcome of the full-suite verification, when one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite_outcome: Option<TestOutcome>,
    /// Whether the operation met its own success criterion.
    pub success: bool,
}

impl RunSummary {
    pub fn start(operation: Operation) -> Self {
        Self {
            operation,
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
            suite_outcome: None,
            success: false,
        }
    }

    pub fn record(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    /// Close the run with its success verdict.
    #[must_use]
    pub fn finish(mut self, success: bool) -> Self {
        self.success = success;
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Ids of patches with an unexpected or failed outcome, in run order.
    pub fn failing_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.is_unexpected())
            .map(|r| r.patch_id.as_str())
            .collect()
    }

    pub fn result_for(&self, patch_id: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.patch_id == patch_id)
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// State of one registered patch, for `status`.
#[derive(Debug, Clone, Serialize)]
pub struct PatchStatus {
    pub id: String,
    pub name: String,
    pub layer: String,
    pub bug: bool,
    pub state: PatchState,
}

/// Read-only snapshot of every registered patch.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub patches: Vec<PatchStatus>,
}

impl StatusReport {
    pub fn applied(&self) -> impl Iterator<Item = &PatchStatus> {
        self.patches
            .iter()
            .filter(|p| p.state == PatchState::Applied)
    }

    pub fn state_of(&self, id: &str) -> Option<PatchState> {
        self.patches.iter().find(|p| p.id == id).map(|p| p.state)
    }
}
