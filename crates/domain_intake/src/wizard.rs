//! Wizard controller
//!
//! Orchestrates the ordered steps, owns the merged [`ClaimDraft`] and the
//! evidence previews, and performs the final submission.
//!
//! # States
//!
//! ```text
//! Step(0) <-> Step(1) <-> ... <-> Step(n-1 = Review)
//!                                      │ submit (confirmed)
//!                                      ▼
//!                                 Submitting ──> Submitted
//!                                      │ error, timeout, or future dropped
//!                                      ▼
//!                                 SubmitFailed ── submit (retry)
//!                                      │ back
//!                                      ▼
//!                                 Step(n-1)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let mut wizard = ClaimWizard::new(IntakeConfig::default(), submitter);
//! wizard.form_mut().set("platform", "youtube");
//! // ...
//! let result = wizard.submit_step();
//! wizard.next(result)?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::{CoreError, EntryId, OperationMetadata, PortError, TicketId};

use crate::config::IntakeConfig;
use crate::draft::ClaimDraft;
use crate::error::{FieldArrayError, FileError, IntakeError, SubmissionError, WizardError};
use crate::evidence::{
    CandidateFile, EvidenceFileManager, EvidencePreview, SlotKey, ThumbnailOutcome, ThumbnailRequest,
};
use crate::field_array::ArrayId;
use crate::ports::{ClaimSubmissionPort, SubmissionReceipt, Thumbnail};
use crate::review::ReviewSummary;
use crate::step_form::{StepForm, StepResult};
use crate::steps::{claim_steps, StepDefinition, StepKind};
use crate::value::{FieldValue, ListEntry};

/// Where the wizard is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    /// Editing the step at this index
    Step(usize),
    /// Waiting on the submission collaborator
    Submitting,
    /// Claim accepted; the draft has been discarded
    Submitted { receipt: SubmissionReceipt },
    /// Submission failed; the draft is kept for a retry
    SubmitFailed { message: String, retryable: bool },
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardState::Step(index) => write!(f, "editing step {}", index),
            WizardState::Submitting => write!(f, "submitting"),
            WizardState::Submitted { .. } => write!(f, "submitted"),
            WizardState::SubmitFailed { .. } => write!(f, "waiting for a retry"),
        }
    }
}

/// Holds the wizard in `Submitting` while the collaborator works. If the
/// submission future is dropped first, the wizard falls back to a
/// retryable failure.
struct SubmittingGuard<'a> {
    state: &'a mut WizardState,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(state: &'a mut WizardState) -> Self {
        *state = WizardState::Submitting;
        Self { state }
    }

    fn finish(self, outcome: WizardState) {
        *self.state = outcome;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if matches!(self.state, WizardState::Submitting) {
            warn!("Claim submission abandoned before it completed");
            *self.state = WizardState::SubmitFailed {
                message: "Submission was interrupted before it completed".to_string(),
                retryable: true,
            };
        }
    }
}

/// Target of a staged file within the current step
enum FileTarget {
    Field(&'static str),
    Entry(usize),
}

/// The multi-step claim wizard
pub struct ClaimWizard {
    config: IntakeConfig,
    steps: Vec<StepDefinition>,
    state: WizardState,
    index: usize,
    draft: Option<ClaimDraft>,
    form: StepForm,
    evidence: EvidenceFileManager,
    submitter: Arc<dyn ClaimSubmissionPort>,
}

impl ClaimWizard {
    /// Opens the standard four-step claim wizard
    pub fn new(config: IntakeConfig, submitter: Arc<dyn ClaimSubmissionPort>) -> Self {
        let steps = claim_steps(&config);
        let form = StepForm::new(steps[0].clone());
        let evidence = EvidenceFileManager::new(config.max_file_bytes);
        let draft = ClaimDraft::new();
        debug!(draft_id = %draft.id, "Claim wizard opened");

        Self {
            config,
            steps,
            state: WizardState::Step(0),
            index: 0,
            draft: Some(draft),
            form,
            evidence,
            submitter,
        }
    }

    /// Opens a wizard over custom steps; the last one must be the review step
    pub fn with_steps(
        config: IntakeConfig,
        steps: Vec<StepDefinition>,
        submitter: Arc<dyn ClaimSubmissionPort>,
    ) -> Result<Self, CoreError> {
        let first = steps
            .first()
            .cloned()
            .ok_or_else(|| CoreError::invalid_definition("wizard needs at least one step"))?;
        if steps.last().map(|step| step.kind) != Some(StepKind::Review) {
            return Err(CoreError::invalid_definition("the last wizard step must be the review step"));
        }

        let evidence = EvidenceFileManager::new(config.max_file_bytes);
        Ok(Self {
            config,
            steps,
            state: WizardState::Step(0),
            index: 0,
            draft: Some(ClaimDraft::new()),
            form: StepForm::new(first),
            evidence,
            submitter,
        })
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> StepKind {
        self.steps[self.index].kind
    }

    /// The draft, until it is discarded by a successful submission
    pub fn draft(&self) -> Option<&ClaimDraft> {
        self.draft.as_ref()
    }

    pub fn form(&self) -> &StepForm {
        &self.form
    }

    /// Direct access for field edits. Array entries holding files should be
    /// removed through [`ClaimWizard::remove_entry`] so their previews are released.
    pub fn form_mut(&mut self) -> &mut StepForm {
        &mut self.form
    }

    pub fn evidence(&self) -> &EvidenceFileManager {
        &self.evidence
    }

    pub fn review_summary(&self) -> Option<ReviewSummary> {
        self.draft
            .as_ref()
            .map(|draft| ReviewSummary::build(draft, &self.steps))
    }

    /// Validates the current step against the draft
    pub fn submit_step(&mut self) -> StepResult {
        let context = self.draft.as_ref().map(ClaimDraft::flatten).unwrap_or_default();
        self.form.submit_step(&context)
    }

    /// Validates one field of the current step
    pub fn blur(&mut self, field: &str) -> Option<String> {
        let context = self.draft.as_ref().map(ClaimDraft::flatten).unwrap_or_default();
        self.form.blur(field, &context).map(str::to_string)
    }

    /// Merges a valid step result and moves to the following step. On the
    /// last step the result is merged and the wizard stays put.
    ///
    /// # Errors
    ///
    /// `StepInvalid` for an invalid result, `StepMismatch` for a result from
    /// another step, `NotStaged` for a file that did not come through
    /// [`ClaimWizard::stage_file`], `InvalidState` outside step editing.
    pub fn next(&mut self, result: StepResult) -> Result<(), IntakeError> {
        self.ensure_editing()?;
        let expected = self.current_step();
        if result.step != expected {
            return Err(WizardError::StepMismatch {
                expected,
                actual: result.step,
            }
            .into());
        }
        if !result.valid {
            warn!(step = %expected, error_count = result.errors.len(), "Next rejected, step is invalid");
            return Err(WizardError::StepInvalid {
                step: expected,
                error_count: result.errors.len(),
            }
            .into());
        }
        let unstaged = result
            .values
            .values()
            .flat_map(FieldValue::files)
            .find(|file| !self.evidence.holds(&file.id));
        if let Some(file) = unstaged {
            warn!(step = %expected, file = %file.name, "Next rejected, file was never staged");
            return Err(FileError::NotStaged {
                name: file.name.clone(),
            }
            .into());
        }

        let definition = &self.steps[self.index];
        let draft = self.draft.as_mut().ok_or_else(Self::closed)?;
        let changed = draft.merge(definition, &result.values);
        debug!(step = %expected, keys = result.values.len(), changed, "Step merged into draft");

        if self.index + 1 < self.steps.len() {
            self.index += 1;
            self.state = WizardState::Step(self.index);
            self.load_form();
        }
        self.reconcile_evidence();
        Ok(())
    }

    /// Returns to the previous step, keeping merged values. Unsubmitted
    /// edits on the step being left are dropped, and files staged only by
    /// those edits are released. From `SubmitFailed` it reopens the review step.
    pub fn back(&mut self) -> Result<(), IntakeError> {
        match self.state {
            WizardState::Step(0) => return Ok(()),
            WizardState::Step(_) => {
                self.index -= 1;
                self.state = WizardState::Step(self.index);
            }
            WizardState::SubmitFailed { .. } => {
                self.state = WizardState::Step(self.index);
            }
            WizardState::Submitting | WizardState::Submitted { .. } => {
                return Err(WizardError::InvalidState(self.state.to_string()).into());
            }
        }
        if self.draft.is_none() {
            return Err(Self::closed().into());
        }

        self.load_form();
        self.reconcile_evidence();
        debug!(step = %self.current_step(), "Navigated back");
        Ok(())
    }

    /// Stages a file into a slot of the current step and records it as the
    /// field's value. A file it replaces that the draft still references
    /// keeps its preview until the step is submitted or abandoned.
    pub fn stage_file(&mut self, slot: SlotKey, candidate: CandidateFile) -> Result<EvidencePreview, IntakeError> {
        self.ensure_editing()?;
        let target = self.file_target(slot)?;
        if let Err(error) = self.evidence.check(slot.kind(), &candidate) {
            warn!(slot = %slot.kind(), file = %candidate.name, %error, "Evidence file rejected");
            return Err(error.into());
        }
        self.set_aside(&slot);
        let preview = self.evidence.stage(slot, candidate)?;
        let value = FieldValue::File(preview.source.clone());

        match target {
            FileTarget::Field(field) => self.form.set(field, value),
            FileTarget::Entry(index) => self.form.set_entry(ArrayId::AdditionalFiles, index, value)?,
        }
        Ok(preview)
    }

    /// Stages a file into the additional-files entry at `index`
    pub fn stage_additional_file(
        &mut self,
        index: usize,
        candidate: CandidateFile,
    ) -> Result<EvidencePreview, IntakeError> {
        let entry = self.entry_id(ArrayId::AdditionalFiles, index)?;
        self.stage_file(SlotKey::Entry(entry), candidate)
    }

    /// Clears a staged file and its preview
    pub fn clear_file(&mut self, slot: SlotKey) -> Result<(), IntakeError> {
        self.ensure_editing()?;
        let target = self.file_target(slot)?;
        self.set_aside(&slot);
        match target {
            FileTarget::Field(field) => self.form.clear(field),
            FileTarget::Entry(index) => self.form.set_entry(ArrayId::AdditionalFiles, index, FieldValue::Empty)?,
        }
        Ok(())
    }

    /// Adds a blank entry to a field array of the current step
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` when the array is full; nothing changes.
    pub fn append_entry(&mut self, array: ArrayId) -> Result<EntryId, IntakeError> {
        self.ensure_editing()?;
        Ok(self.form.arrays_mut().append(array)?)
    }

    /// Removes an array entry (already confirmed by the user) and releases
    /// any preview staged for it
    pub fn remove_entry(&mut self, array: ArrayId, index: usize) -> Result<ListEntry, IntakeError> {
        self.ensure_editing()?;
        let removed = self.form.arrays_mut().remove(array, index)?;
        self.set_aside(&SlotKey::Entry(removed.id));
        Ok(removed)
    }

    /// Sets the value of an array entry (e.g. a link)
    pub fn set_entry(&mut self, array: ArrayId, index: usize, value: impl Into<FieldValue>) -> Result<(), IntakeError> {
        self.ensure_editing()?;
        Ok(self.form.set_entry(array, index, value)?)
    }

    /// Outstanding video thumbnail jobs
    pub fn thumbnail_requests(&self) -> Vec<ThumbnailRequest> {
        self.evidence.thumbnail_requests()
    }

    /// Applies a rendered thumbnail; superseded results are dropped
    pub fn complete_thumbnail(&mut self, ticket: TicketId, result: Result<Thumbnail, PortError>) -> ThumbnailOutcome {
        self.evidence.complete_thumbnail(ticket, result)
    }

    /// Hands the confirmed draft to the submission collaborator
    ///
    /// Allowed from the review step and, for retries, from `SubmitFailed`.
    /// The call is bounded by the configured timeout; there is no automatic
    /// retry. Dropping the future before it completes leaves the wizard in a
    /// retryable `SubmitFailed`.
    ///
    /// # Errors
    ///
    /// `NotOnReviewStep`, `NotConfirmed`, `InvalidState`, or a
    /// `SubmissionError` after which the draft is retained.
    #[instrument(skip(self), fields(draft_id = tracing::field::Empty))]
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, IntakeError> {
        match &self.state {
            WizardState::Step(index) if self.steps[*index].kind == StepKind::Review => {}
            WizardState::SubmitFailed { .. } => {}
            WizardState::Step(_) => return Err(WizardError::NotOnReviewStep.into()),
            state => return Err(WizardError::InvalidState(state.to_string()).into()),
        }

        let timeout = self.config.submission_timeout();
        let result = {
            let draft = self.draft.as_ref().ok_or_else(Self::closed)?;
            if !draft.confirmed {
                return Err(WizardError::NotConfirmed.into());
            }
            tracing::Span::current().record("draft_id", tracing::field::display(draft.id));

            let guard = SubmittingGuard::enter(&mut self.state);
            let metadata = OperationMetadata::with_correlation_id(draft.id.to_string());
            let result = match tokio::time::timeout(timeout, self.submitter.submit_claim(draft, &metadata)).await {
                Ok(Ok(receipt)) => Ok(receipt),
                Ok(Err(error)) => Err(SubmissionError::from(error)),
                Err(_) => Err(SubmissionError::Timeout {
                    timeout_secs: timeout.as_secs(),
                }),
            };
            guard.finish(match &result {
                Ok(receipt) => WizardState::Submitted {
                    receipt: receipt.clone(),
                },
                Err(error) => WizardState::SubmitFailed {
                    message: error.to_string(),
                    retryable: error.is_retryable(),
                },
            });
            result
        };

        match result {
            Ok(receipt) => {
                info!(claim_id = %receipt.claim_id, claim_number = %receipt.claim_number, "Claim submitted");
                self.evidence.release_all();
                self.draft = None;
                Ok(receipt)
            }
            Err(error) => {
                warn!(%error, retryable = error.is_retryable(), "Claim submission failed");
                Err(error.into())
            }
        }
    }

    /// Tears the wizard down (navigation away): releases every preview and
    /// discards the draft
    pub fn dispose(&mut self) {
        let released = self.evidence.release_all();
        if self.draft.take().is_some() {
            debug!(released, "Claim wizard disposed");
        }
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.state {
            WizardState::Step(_) if self.draft.is_some() => Ok(()),
            WizardState::Step(_) => Err(Self::closed()),
            _ => Err(WizardError::InvalidState(self.state.to_string())),
        }
    }

    /// Takes a file out of its slot. A file the draft references is
    /// shelved so that abandoning the step brings it back.
    fn set_aside(&mut self, slot: &SlotKey) {
        let referenced = match (self.draft.as_ref(), self.evidence.file(slot)) {
            (Some(draft), Some(file)) => draft.referenced_files().contains(&file.id),
            _ => false,
        };
        if referenced {
            self.evidence.shelve(slot);
        } else {
            self.evidence.release(slot);
        }
    }

    fn closed() -> WizardError {
        WizardError::InvalidState("closed".to_string())
    }

    fn load_form(&mut self) {
        let definition = self.steps[self.index].clone();
        let defaults = self
            .draft
            .as_ref()
            .map(|draft| draft.defaults_for(definition.kind))
            .unwrap_or_default();
        self.form = StepForm::new(definition);
        self.form.initialize(&defaults);
    }

    /// Releases previews of files the draft does not reference and the
    /// current form does not hold; shelved draft files go back to their slots
    fn reconcile_evidence(&mut self) {
        let Some(draft) = self.draft.as_ref() else {
            return;
        };
        let mut keep = draft.referenced_files();
        keep.extend(
            self.form
                .owned_values()
                .values()
                .flat_map(FieldValue::files)
                .map(|file| file.id),
        );
        let released = self.evidence.retain_files(|id| keep.contains(id));
        if released > 0 {
            debug!(released, "Released previews of abandoned files");
        }
    }

    fn file_target(&self, slot: SlotKey) -> Result<FileTarget, IntakeError> {
        let not_in_step = || FileError::SlotNotInStep(slot.kind().to_string());
        match slot {
            SlotKey::Named(kind) => {
                let field = kind.field_name().ok_or_else(not_in_step)?;
                if !self.form.definition().declares(field) {
                    return Err(not_in_step().into());
                }
                Ok(FileTarget::Field(field))
            }
            SlotKey::Entry(entry) => {
                let array = self
                    .form
                    .arrays()
                    .get(ArrayId::AdditionalFiles)
                    .map_err(|_| not_in_step())?;
                let index = array.position(entry).ok_or_else(not_in_step)?;
                Ok(FileTarget::Entry(index))
            }
        }
    }

    fn entry_id(&self, array: ArrayId, index: usize) -> Result<EntryId, IntakeError> {
        let entries = self.form.arrays().values(array)?;
        entries
            .get(index)
            .map(|entry| entry.id)
            .ok_or_else(|| {
                FieldArrayError::IndexOutOfRange {
                    array,
                    index,
                    len: entries.len(),
                }
                .into()
            })
    }
}

impl fmt::Debug for ClaimWizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimWizard")
            .field("state", &self.state)
            .field("index", &self.index)
            .field("draft", &self.draft.as_ref().map(|draft| draft.id))
            .field("staged_files", &self.evidence.staged_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySubmissionAdapter;
    use crate::evidence::SlotKind;

    fn wizard() -> ClaimWizard {
        ClaimWizard::new(IntakeConfig::default(), Arc::new(InMemorySubmissionAdapter::new()))
    }

    #[test]
    fn test_opens_on_first_step() {
        let wizard = wizard();
        assert_eq!(wizard.state(), &WizardState::Step(0));
        assert_eq!(wizard.current_step(), StepKind::Incident);
        assert_eq!(wizard.step_count(), 4);
        assert!(wizard.draft().is_some());
    }

    #[test]
    fn test_next_rejects_invalid_result() {
        let mut wizard = wizard();
        let result = wizard.submit_step();
        assert!(!result.valid);

        let error = wizard.next(result).unwrap_err();
        assert!(matches!(
            error,
            IntakeError::Wizard(WizardError::StepInvalid { step: StepKind::Incident, .. })
        ));
        assert_eq!(wizard.step_index(), 0);
    }

    #[test]
    fn test_next_rejects_result_from_another_step() {
        let mut wizard = wizard();
        let result = StepResult {
            step: StepKind::Account,
            valid: true,
            values: Default::default(),
            errors: Default::default(),
        };
        assert!(matches!(
            wizard.next(result),
            Err(IntakeError::Wizard(WizardError::StepMismatch { .. }))
        ));
    }

    #[test]
    fn test_back_on_first_step_is_noop() {
        let mut wizard = wizard();
        wizard.back().unwrap();
        assert_eq!(wizard.state(), &WizardState::Step(0));
    }

    #[test]
    fn test_stage_file_outside_step() {
        let mut wizard = wizard();
        let error = wizard
            .stage_file(
                SlotKey::Named(SlotKind::AccountScreenshot),
                CandidateFile::new("status.png", "image/png", 1024),
            )
            .unwrap_err();
        assert!(matches!(error, IntakeError::File(FileError::SlotNotInStep(_))));
        assert_eq!(wizard.evidence().staged_count(), 0);
    }

    #[test]
    fn test_with_steps_requires_review_last() {
        let config = IntakeConfig::default();
        let steps = vec![crate::steps::incident_step(&config)];
        let result = ClaimWizard::with_steps(config, steps, Arc::new(InMemorySubmissionAdapter::new()));
        assert!(matches!(result, Err(CoreError::InvalidDefinition(_))));
    }

    #[tokio::test]
    async fn test_submit_requires_review_step() {
        let mut wizard = wizard();
        assert!(matches!(
            wizard.submit().await,
            Err(IntakeError::Wizard(WizardError::NotOnReviewStep))
        ));
        assert_eq!(wizard.state(), &WizardState::Step(0));
    }

    #[test]
    fn test_dispose_discards_draft() {
        let mut wizard = wizard();
        wizard.dispose();
        assert!(wizard.draft().is_none());
        let result = wizard.submit_step();
        assert!(matches!(
            wizard.next(result),
            Err(IntakeError::Wizard(WizardError::InvalidState(_)))
        ));
    }
}
