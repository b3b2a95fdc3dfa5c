//! Wizard Flow Helpers
//!
//! Drive a [`ClaimWizard`] through its steps with the fixture inputs so
//! tests can start from the step they care about.

use std::sync::Arc;

use domain_intake::adapters::InMemorySubmissionAdapter;
use domain_intake::{
    ClaimWizard, IntakeConfig, IntakeError, Record, SlotKey, SlotKind, StepForm,
};

use crate::fixtures::{FileFixtures, IntakeFixtures};

/// Opens a wizard with default configuration over the given adapter
pub fn open_wizard(adapter: Arc<InMemorySubmissionAdapter>) -> ClaimWizard {
    ClaimWizard::new(IntakeConfig::default(), adapter)
}

/// Writes every value into the form
pub fn fill(form: &mut StepForm, values: &Record) {
    for (field, value) in values {
        form.set(field, value.clone());
    }
}

/// Fills and submits the incident step
pub fn complete_incident(wizard: &mut ClaimWizard) -> Result<(), IntakeError> {
    fill(wizard.form_mut(), &IntakeFixtures::incident_values());
    let result = wizard.submit_step();
    wizard.next(result)
}

/// Fills the account step, stages a bank statement, and submits
pub fn complete_account(wizard: &mut ClaimWizard) -> Result<(), IntakeError> {
    fill(wizard.form_mut(), &IntakeFixtures::account_values());
    wizard.stage_file(SlotKey::Named(SlotKind::BankStatement), FileFixtures::bank_statement())?;
    let result = wizard.submit_step();
    wizard.next(result)
}

/// Stages only the account screenshot and submits
pub fn complete_evidence(wizard: &mut ClaimWizard) -> Result<(), IntakeError> {
    wizard.stage_file(SlotKey::Named(SlotKind::AccountScreenshot), FileFixtures::status_screenshot())?;
    let result = wizard.submit_step();
    wizard.next(result)
}

/// Ticks the confirmation box on the review step and merges it
pub fn confirm_review(wizard: &mut ClaimWizard) -> Result<(), IntakeError> {
    wizard.form_mut().set("confirmed", true);
    let result = wizard.submit_step();
    wizard.next(result)
}

/// Completes the three data-entry steps, leaving the wizard on review
pub fn advance_to_review(wizard: &mut ClaimWizard) -> Result<(), IntakeError> {
    complete_incident(wizard)?;
    complete_account(wizard)?;
    complete_evidence(wizard)
}
