//! Ports and Adapters Infrastructure
//!
//! Shared types for the collaborators the intake core talks to but does not
//! implement itself: claim submission and video thumbnail rendering.
//!
//! ```text
//!        ┌──────────────────────────────┐
//!        │        Wizard Controller     │
//!        └──────────────────────────────┘
//!                       │
//!                       ▼
//!        ┌──────────────────────────────┐
//!        │  Port traits (domain crates) │
//!        │  ClaimSubmissionPort, ...    │
//!        └──────────────────────────────┘
//!               ▲                 ▲
//!     ┌─────────┴──────┐   ┌──────┴──────────┐
//!     │   In-memory    │   │ Network adapter │
//!     │   (tests)      │   │   (external)    │
//!     └────────────────┘   └─────────────────┘
//! ```

use std::collections::BTreeMap;
use thiserror::Error;

/// Failure reported by a collaborator
///
/// The wizard only needs to know two things about a failure: whether the
/// collaborator refused the claim itself, and whether trying again later
/// may succeed (see [`PortError::is_transient`]).
#[derive(Debug, Error)]
pub enum PortError {
    /// The collaborator refused the payload; resending it will not help
    #[error("Rejected: {message}")]
    Rejected {
        message: String,
        field: Option<String>,
    },

    /// The collaborator could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The collaborator gave up on its own deadline
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The collaborator is up but not accepting work
    #[error("{service} is unavailable")]
    Unavailable {
        service: String,
        retry_after_secs: Option<u64>,
    },

    /// Anything else, e.g. a payload that could not be encoded
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    pub fn rejected(message: impl Into<String>) -> Self {
        PortError::Rejected {
            message: message.into(),
            field: None,
        }
    }

    /// Rejection pinned to one field of the draft
    pub fn rejected_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Rejected {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::Unavailable {
            service: service.into(),
            retry_after_secs: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if a later retry with the same input may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::Timeout { .. } | PortError::Unavailable { .. }
        )
    }
}

/// Marker trait for all domain ports
///
/// Port traits extend this marker so adapters can be shared behind an
/// `Arc<dyn ...>` and used from async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Context passed along with every port call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMetadata {
    /// Ties the call to the wizard session that made it
    pub correlation_id: Option<String>,
    /// Free-form tags for the collaborator's logs
    pub context: BTreeMap<String, String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            context: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PortError::connection("reset by peer").is_transient());
        assert!(PortError::unavailable("claims-gateway").is_transient());
        assert!(PortError::Timeout {
            operation: "submit_claim".to_string(),
            duration_ms: 5000,
        }
        .is_transient());

        assert!(!PortError::rejected("duplicate claim").is_transient());
        assert!(!PortError::internal("encoding failed").is_transient());
    }

    #[test]
    fn test_display_names_the_service() {
        let error = PortError::unavailable("claims-gateway");
        assert_eq!(error.to_string(), "claims-gateway is unavailable");
    }

    #[test]
    fn test_operation_metadata() {
        let metadata = OperationMetadata::with_correlation_id("DRF-1")
            .with_context("step", "Review");

        assert_eq!(metadata.correlation_id.as_deref(), Some("DRF-1"));
        assert_eq!(metadata.context.get("step").map(String::as_str), Some("Review"));
    }
}
