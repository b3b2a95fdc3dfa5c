//! Intake configuration

use std::time::Duration;

use serde::Deserialize;

use core_kernel::CoreError;

/// Tunables for the claim wizard
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Seconds to wait for the submission collaborator before failing
    pub submission_timeout_secs: u64,
    /// Size cap shared by every evidence slot
    pub max_file_bytes: u64,
    /// Capacity of the additional files array
    pub additional_files_capacity: usize,
    /// Capacity of the additional links array
    pub additional_urls_capacity: usize,
    /// Character limit for long free-text fields
    pub max_text_length: usize,
    /// Log level
    pub log_level: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            submission_timeout_secs: 30,
            max_file_bytes: 5 * 1024 * 1024,
            additional_files_capacity: 7,
            additional_urls_capacity: 5,
            max_text_length: 1000,
            log_level: "info".to_string(),
        }
    }
}

impl IntakeConfig {
    /// Loads configuration from `INTAKE_*` environment variables, reading a
    /// `.env` file first if one is present. Unset keys keep their defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::Environment::with_prefix("INTAKE").try_parsing(true))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))
    }

    /// Returns the submission timeout
    pub fn submission_timeout(&self) -> Duration {
        Duration::from_secs(self.submission_timeout_secs)
    }
}
