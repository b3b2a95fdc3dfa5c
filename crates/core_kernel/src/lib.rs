//! Core Kernel - Foundational types shared by the claim intake crates
//!
//! This crate provides the building blocks used across the intake modules:
//! - Strongly-typed identifiers for drafts, files, array entries and previews
//! - Kernel error types
//! - Port infrastructure for external collaborators

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ClaimId, DraftId, FileId, EntryId, PreviewId, TicketId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort, OperationMetadata};
