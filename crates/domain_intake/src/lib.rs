//! Claim Intake Domain
//!
//! This crate implements the multi-step claim submission wizard used by
//! content creators to report demonetization, suspensions and similar
//! platform incidents.
//!
//! # Wizard Flow
//!
//! ```text
//! Incident -> Account -> Evidence -> Review -> Submitting -> Submitted
//!                                                  \
//!                                                   -> SubmitFailed (retry)
//! ```
//!
//! Each step is a [`StepForm`] validated by the declarative rule engine in
//! [`rules`]. Valid step output is merged into the [`ClaimDraft`] owned by
//! the [`ClaimWizard`].

pub mod value;
pub mod rules;
pub mod field_array;
pub mod evidence;
pub mod step_form;
pub mod steps;
pub mod draft;
pub mod review;
pub mod ports;
pub mod wizard;
pub mod config;
pub mod error;
pub mod adapters;

pub use value::{FieldValue, FileRef, ListEntry, Record};
pub use rules::{Rule, CustomRule, ValidationError, validate};
pub use field_array::{ArrayId, ArrayDeclaration, FieldArray, FieldArrays};
pub use evidence::{
    CandidateFile, EvidenceFileManager, EvidencePreview, PreviewKind, SlotKey, SlotKind,
    ThumbnailOutcome, ThumbnailRequest, ThumbnailState,
};
pub use step_form::{FieldDeclaration, StepForm, StepPhase, StepResult};
pub use steps::{StepDefinition, StepKind, claim_steps};
pub use draft::ClaimDraft;
pub use review::ReviewSummary;
pub use ports::{ClaimSubmissionPort, SubmissionReceipt, Thumbnail, ThumbnailPort};
pub use wizard::{ClaimWizard, WizardState};
pub use config::IntakeConfig;
pub use error::{FieldArrayError, FileError, IntakeError, SubmissionError, WizardError};
