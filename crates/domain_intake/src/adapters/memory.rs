//! In-memory submission adapter

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{ClaimId, DomainPort, OperationMetadata, PortError};

use crate::draft::ClaimDraft;
use crate::ports::{ClaimSubmissionPort, SubmissionReceipt};

/// A draft accepted by the adapter
#[derive(Debug, Clone)]
pub struct StoredSubmission {
    pub receipt: SubmissionReceipt,
    /// JSON snapshot of the draft as it was sent
    pub payload: serde_json::Value,
    pub correlation_id: Option<String>,
}

/// Submission port backed by memory
///
/// Failures queued with [`InMemorySubmissionAdapter::fail_next`] are
/// returned in order before any submission is accepted again.
#[derive(Debug, Default)]
pub struct InMemorySubmissionAdapter {
    submissions: RwLock<Vec<StoredSubmission>>,
    failures: RwLock<VecDeque<PortError>>,
    delay: Option<Duration>,
    attempts: AtomicU64,
}

impl InMemorySubmissionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response, e.g. to trip the wizard's timeout
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues an error for the next submission attempt
    pub async fn fail_next(&self, error: PortError) {
        self.failures.write().await.push_back(error);
    }

    /// Accepted submissions in arrival order
    pub async fn submissions(&self) -> Vec<StoredSubmission> {
        self.submissions.read().await.clone()
    }

    /// Every call to `submit_claim`, including failed and stalled ones
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl DomainPort for InMemorySubmissionAdapter {}

#[async_trait]
impl ClaimSubmissionPort for InMemorySubmissionAdapter {
    async fn submit_claim(
        &self,
        draft: &ClaimDraft,
        metadata: &OperationMetadata,
    ) -> Result<SubmissionReceipt, PortError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.write().await.pop_front() {
            debug!(attempt, %error, "Scripted submission failure");
            return Err(error);
        }

        let payload = serde_json::to_value(draft).map_err(|e| PortError::internal(e.to_string()))?;
        let mut submissions = self.submissions.write().await;
        let receipt = SubmissionReceipt {
            claim_id: ClaimId::new_v7(),
            claim_number: claim_number(submissions.len() as u64),
            submitted_at: Utc::now(),
        };
        submissions.push(StoredSubmission {
            receipt: receipt.clone(),
            payload,
            correlation_id: metadata.correlation_id.clone(),
        });
        debug!(attempt, claim_number = %receipt.claim_number, "Submission stored");
        Ok(receipt)
    }
}

fn claim_number(sequence: u64) -> String {
    let millis = Utc::now().timestamp_millis().unsigned_abs();
    format!("CLM-{}{:03}", millis % 10_000_000, sequence % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_failure_then_success() {
        let adapter = InMemorySubmissionAdapter::new();
        adapter.fail_next(PortError::connection("network down")).await;
        let draft = ClaimDraft::new();
        let metadata = OperationMetadata::with_correlation_id(draft.id.to_string());

        let first = adapter.submit_claim(&draft, &metadata).await;
        assert!(matches!(first, Err(PortError::Connection { .. })));

        let receipt = adapter.submit_claim(&draft, &metadata).await.unwrap();
        assert!(receipt.claim_number.starts_with("CLM-"));
        assert_eq!(adapter.attempts(), 2);

        let stored = adapter.submissions().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].correlation_id.as_deref(), Some(draft.id.to_string().as_str()));
        assert_eq!(stored[0].payload["confirmed"], serde_json::Value::Bool(false));
    }
}
