//! Custom assertions for run summaries.

use crate::orchestrator::{Outcome, RunSummary, TestStatus};

/// Assert that `patch_id` was recorded with `expected`.
///
/// # Panics
///
/// Panics with the full result list if the patch is absent or differs.
///
/// # Example
///
/// ```rust,ignore
/// let summary = orchestrator.setup_broken()?;
/// assert_outcome(&summary, "bug-03", Outcome::Conflict);
/// ```
pub fn assert_outcome(summary: &RunSummary, patch_id: &str, expected: Outcome) {
    let result = summary.result_for(patch_id).unwrap_or_else(|| {
        panic!(
            "No result recorded for {}.\nResults: {:?}",
            patch_id, summary.results
        )
    });
    assert_eq!(
        result.outcome, expected,
        "Unexpected outcome for {}.\nResults: {:?}",
        patch_id, summary.results
    );
}

/// Assert the test status recorded for `patch_id`.
///
/// # Panics
///
/// Panics if the patch is absent or its test status differs.
pub fn assert_test_status(summary: &RunSummary, patch_id: &str, expected: TestStatus) {
    let result = summary
        .result_for(patch_id)
        .unwrap_or_else(|| panic!("No result recorded for {}", patch_id));
    assert_eq!(
        result.test_outcome, expected,
        "Unexpected test status for {}",
        patch_id
    );
}

/// Assert that the run met its success criterion.
///
/// # Panics
///
/// Panics if the run failed.
pub fn assert_run_succeeded(summary: &RunSummary) {
    assert!(
        summary.success,
        "Expected {} to succeed.\nFailing: {:?}\nSuite: {:?}",
        summary.operation,
        summary.failing_ids(),
        summary.suite_outcome
    );
    assert_eq!(summary.exit_code(), 0);
}

/// Assert that the run did not meet its success criterion.
///
/// # Panics
///
/// Panics if the run succeeded.
pub fn assert_run_failed(summary: &RunSummary) {
    assert!(
        !summary.success,
        "Expected {} to fail, but it succeeded.",
        summary.operation
    );
    assert_eq!(summary.exit_code(), 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{Action, Operation, ScenarioResult};

    fn summary() -> RunSummary {
        let mut summary = RunSummary::start(Operation::SetupBroken);
        summary.record(ScenarioResult::new("bug-01", Action::Apply, Outcome::Success));
        summary.finish(true)
    }

    #[test]
    fn test_assert_outcome_passes() {
        assert_outcome(&summary(), "bug-01", Outcome::Success);
        assert_test_status(&summary(), "bug-01", TestStatus::Skipped);
        assert_run_succeeded(&summary());
    }

    #[test]
    #[should_panic(expected = "No result recorded")]
    fn test_assert_outcome_missing_patch() {
        assert_outcome(&summary(), "bug-09", Outcome::Success);
    }

    #[test]
    #[should_panic(expected = "Expected setup-broken to fail")]
    fn test_assert_run_failed_panics_on_success() {
        assert_run_failed(&summary());
    }
}
