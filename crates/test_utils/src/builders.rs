//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use domain_intake::evidence::MIME_JPEG;
use domain_intake::{CandidateFile, FieldValue, Record};

use crate::fixtures::{IntakeFixtures, MB};

/// Builder for candidate files
pub struct CandidateFileBuilder {
    name: String,
    mime_type: String,
    size_bytes: u64,
}

impl Default for CandidateFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateFileBuilder {
    /// Creates a 1 MB JPEG by default
    pub fn new() -> Self {
        Self {
            name: "evidence.jpg".to_string(),
            mime_type: MIME_JPEG.to_string(),
            size_bytes: MB,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Sets the size in whole mebibytes
    pub fn with_size_mb(self, megabytes: u64) -> Self {
        self.with_size_bytes(megabytes * MB)
    }

    pub fn build(self) -> CandidateFile {
        CandidateFile::new(self.name, self.mime_type, self.size_bytes)
    }
}

/// Builder for incident step input, starting from a valid incident
pub struct IncidentInputBuilder {
    values: Record,
}

impl Default for IncidentInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentInputBuilder {
    pub fn new() -> Self {
        Self {
            values: IntakeFixtures::incident_values(),
        }
    }

    /// Sets any incident field
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    /// Leaves a field empty
    pub fn without(mut self, field: &str) -> Self {
        self.values.remove(field);
        self
    }

    pub fn with_platform(self, platform: &str) -> Self {
        self.with("platform", platform)
    }

    pub fn with_incident_type(self, incident_type: &str) -> Self {
        self.with("incidentType", incident_type)
    }

    pub fn with_prior_warnings(self, answer: &str) -> Self {
        self.with("priorWarnings", answer)
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with("description", description.into())
    }

    pub fn build(self) -> Record {
        self.values
    }
}
