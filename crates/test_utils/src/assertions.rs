//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use domain_intake::{ClaimWizard, StepResult};

/// Asserts that a step result failed on exactly these keys
///
/// # Panics
///
/// Panics if the result is valid or its error keys differ
pub fn assert_error_keys(result: &StepResult, expected: &[&str]) {
    let mut actual: Vec<&str> = result.errors.keys().map(String::as_str).collect();
    let mut expected = expected.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert!(!result.valid, "Expected an invalid {} step, got a valid one", result.step);
    assert_eq!(actual, expected, "Unexpected error keys for the {} step", result.step);
}

/// Asserts that a step result is valid, printing its errors otherwise
pub fn assert_step_valid(result: &StepResult) {
    assert!(
        result.valid,
        "Expected the {} step to be valid, got errors: {:?}",
        result.step,
        result.errors
    );
}

/// Asserts that every preview handle the wizard created has been revoked
pub fn assert_no_live_previews(wizard: &ClaimWizard) {
    let evidence = wizard.evidence();
    assert_eq!(
        evidence.live_handles(),
        0,
        "{} preview handle(s) still live across {} staged file(s)",
        evidence.live_handles(),
        evidence.staged_count()
    );
}
