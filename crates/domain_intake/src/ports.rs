//! Claim Intake Ports
//!
//! The wizard does not know how claims reach the back office or how video
//! posters are rendered. Both are collaborators behind port traits:
//!
//! - [`ClaimSubmissionPort`]: receives the confirmed draft, returns a receipt
//! - [`ThumbnailPort`]: renders a poster frame for a staged video
//!
//! ```rust,ignore
//! let submitter: Arc<dyn ClaimSubmissionPort> = Arc::new(InMemorySubmissionAdapter::new());
//! let mut wizard = ClaimWizard::new(IntakeConfig::default(), submitter);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainPort, OperationMetadata, PortError};

use crate::draft::ClaimDraft;
use crate::value::FileRef;

/// Acknowledgement returned by the submission collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Identifier of the created claim
    pub claim_id: ClaimId,
    /// Human-readable claim number
    pub claim_number: String,
    /// When the collaborator accepted the claim
    pub submitted_at: DateTime<Utc>,
}

/// Rendered poster frame for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Port for handing a confirmed claim to the back office
#[async_trait]
pub trait ClaimSubmissionPort: DomainPort {
    /// Submits the full draft
    ///
    /// # Errors
    ///
    /// Any `PortError`; transient variants let the wizard offer a retry
    async fn submit_claim(
        &self,
        draft: &ClaimDraft,
        metadata: &OperationMetadata,
    ) -> Result<SubmissionReceipt, PortError>;
}

/// Port for rendering video thumbnails
#[async_trait]
pub trait ThumbnailPort: DomainPort {
    async fn render_thumbnail(&self, file: &FileRef) -> Result<Thumbnail, PortError>;
}
