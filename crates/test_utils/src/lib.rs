//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim intake test suite.
//!
//! # Modules
//!
//! - `fixtures`: Valid step inputs and candidate files
//! - `builders`: Builder patterns for test data construction
//! - `flows`: Drives a wizard through its steps
//! - `ports`: Stub port implementations
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators
//! - `logging`: Tracing setup for tests

pub mod fixtures;
pub mod builders;
pub mod flows;
pub mod ports;
pub mod assertions;
pub mod generators;
pub mod logging;

pub use fixtures::*;
pub use builders::*;
pub use flows::*;
pub use ports::*;
pub use assertions::*;
pub use generators::*;
pub use logging::*;
