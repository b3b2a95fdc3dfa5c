//! Kernel errors

use thiserror::Error;

/// Errors raised while setting the intake system up, before any user input
#[derive(Debug, Error)]
pub enum CoreError {
    /// Settings could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A step or field declaration is inconsistent
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }

    pub fn invalid_definition(message: impl Into<String>) -> Self {
        CoreError::InvalidDefinition(message.into())
    }
}
