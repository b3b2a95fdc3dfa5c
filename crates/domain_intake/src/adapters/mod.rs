//! Adapters for the claim intake ports
//!
//! # Available Adapters
//!
//! - **InMemorySubmissionAdapter**: keeps submitted drafts in memory and can
//!   be scripted to fail or stall. Used by tests and local demos.
//!
//! ```rust,ignore
//! use domain_intake::adapters::InMemorySubmissionAdapter;
//! use domain_intake::ClaimSubmissionPort;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(InMemorySubmissionAdapter::new());
//! let port: Arc<dyn ClaimSubmissionPort> = adapter.clone();
//! ```

pub mod memory;

pub use memory::{InMemorySubmissionAdapter, StoredSubmission};
