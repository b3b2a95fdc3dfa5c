//! Claim intake errors
//!
//! Every rejected operation returns one of these. None of them is fatal:
//! the worst case is that the user corrects input and tries again.

use thiserror::Error;

use core_kernel::{CoreError, PortError};

use crate::evidence::SlotKind;
use crate::field_array::ArrayId;
use crate::steps::StepKind;

/// Errors raised by field array operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldArrayError {
    #[error("{array} already holds the maximum of {capacity} entries")]
    CapacityExceeded { array: ArrayId, capacity: usize },

    #[error("{array} has no entry at index {index} (length {len})")]
    IndexOutOfRange { array: ArrayId, index: usize, len: usize },

    #[error("Field array {0} is not part of this step")]
    UnknownArray(ArrayId),
}

/// Errors raised when staging an evidence file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    #[error("File is {size_bytes} bytes; {slot} accepts at most {max_bytes} bytes")]
    FileTooLarge {
        slot: SlotKind,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("{slot} does not accept files of type {mime_type}")]
    UnsupportedType { slot: SlotKind, mime_type: String },

    #[error("Slot {0} is not part of this step")]
    SlotNotInStep(String),

    #[error("{name} was not uploaded through an evidence slot")]
    NotStaged { name: String },
}

/// Errors raised by the final submission
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Submission did not complete within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Claim was rejected: {reason}")]
    Rejected { reason: String },

    #[error("Submission failed: {0}")]
    Port(PortError),
}

impl From<PortError> for SubmissionError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Rejected { message, .. } => SubmissionError::Rejected { reason: message },
            other => SubmissionError::Port(other),
        }
    }
}

impl SubmissionError {
    /// Returns true if a user-initiated retry with the same draft may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmissionError::Timeout { .. } => true,
            SubmissionError::Rejected { .. } => false,
            SubmissionError::Port(error) => error.is_transient(),
        }
    }
}

/// Errors raised by wizard navigation and submission preconditions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{step} step has {error_count} invalid field(s)")]
    StepInvalid { step: StepKind, error_count: usize },

    #[error("Result belongs to the {actual} step but the wizard is on {expected}")]
    StepMismatch { expected: StepKind, actual: StepKind },

    #[error("Claims can only be submitted from the review step")]
    NotOnReviewStep,

    #[error("The claim must be confirmed before it is submitted")]
    NotConfirmed,

    #[error("Operation not allowed while the wizard is {0}")]
    InvalidState(String),
}

/// Umbrella error for wizard operations
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    FieldArray(#[from] FieldArrayError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
