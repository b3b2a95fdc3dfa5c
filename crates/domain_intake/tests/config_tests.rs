//! Tests for loading intake configuration from the environment
//!
//! Kept in their own test binary: they set process-wide variables.

use std::env;

use domain_intake::IntakeConfig;

/// Sets variables for the lifetime of the value and removes them on drop
struct ScopedEnv {
    keys: Vec<&'static str>,
}

impl ScopedEnv {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self {
            keys: vars.iter().map(|(key, _)| *key).collect(),
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for key in &self.keys {
            env::remove_var(key);
        }
    }
}

// ============================================================================
// Environment Loading Tests
// ============================================================================

mod from_env_tests {
    use super::*;

    #[test]
    fn test_intake_variables_override_defaults() {
        let _env = ScopedEnv::set(&[
            ("INTAKE_SUBMISSION_TIMEOUT_SECS", "12"),
            ("INTAKE_MAX_FILE_BYTES", "1048576"),
            ("INTAKE_LOG_LEVEL", "debug"),
        ]);

        let config = IntakeConfig::from_env().unwrap();
        assert_eq!(config.submission_timeout_secs, 12);
        assert_eq!(config.max_file_bytes, 1_048_576);
        assert_eq!(config.log_level, "debug");

        // Unset keys keep their defaults
        assert_eq!(config.additional_files_capacity, 7);
        assert_eq!(config.additional_urls_capacity, 5);
    }
}
