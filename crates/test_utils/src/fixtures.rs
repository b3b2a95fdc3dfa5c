//! Pre-built Test Fixtures
//!
//! Valid inputs for each wizard step and candidate files for each slot.
//! The step inputs together form a claim that passes every rule.

use rust_decimal_macros::dec;

use domain_intake::evidence::{MIME_JPEG, MIME_MP4, MIME_PDF, MIME_PNG};
use domain_intake::{CandidateFile, FieldValue, Record};

/// One mebibyte
pub const MB: u64 = 1024 * 1024;

/// Fixture for step inputs
pub struct IntakeFixtures;

impl IntakeFixtures {
    /// A demonetized YouTube channel, no prior warnings
    pub fn incident_values() -> Record {
        Record::from([
            ("incidentDate".to_string(), FieldValue::from("2025-04-01")),
            ("platform".to_string(), FieldValue::from("youtube")),
            ("incidentType".to_string(), FieldValue::from("demonetization")),
            ("incidentDuration".to_string(), FieldValue::from(7i64)),
            ("audienceSize".to_string(), FieldValue::from(50_000i64)),
            ("priorWarnings".to_string(), FieldValue::from("no")),
            ("platformCommunication".to_string(), FieldValue::from("email")),
            ("affectedContent".to_string(), FieldValue::from("Vlog #12")),
            (
                "description".to_string(),
                FieldValue::from("Channel lost monetization overnight without explanation."),
            ),
        ])
    }

    /// Account details; the bank statement is staged separately
    pub fn account_values() -> Record {
        Record::from([
            ("primaryPlatform".to_string(), FieldValue::from("youtube")),
            ("primaryHandle".to_string(), FieldValue::from("@creator")),
            ("monthlyEarnings".to_string(), FieldValue::from(dec!(2500.00))),
            (
                "incomeSources".to_string(),
                FieldValue::text_list(["ad_revenue", "sponsorships"]),
            ),
            ("bankAccount".to_string(), FieldValue::from("12345678")),
            ("bankName".to_string(), FieldValue::from("First Creator Bank")),
            ("bankBranch".to_string(), FieldValue::from("Downtown")),
            ("penaltyHistory".to_string(), FieldValue::from("no")),
            ("yearsActive".to_string(), FieldValue::from(4i64)),
        ])
    }
}

/// Fixture for candidate files
pub struct FileFixtures;

impl FileFixtures {
    /// 4 MB account status screenshot
    pub fn status_screenshot() -> CandidateFile {
        CandidateFile::new("account-status.jpg", MIME_JPEG, 4 * MB)
    }

    /// 6 MB screenshot, over the default cap
    pub fn oversized_screenshot() -> CandidateFile {
        CandidateFile::new("account-status-raw.jpg", MIME_JPEG, 6 * MB)
    }

    /// 2 MB bank statement
    pub fn bank_statement() -> CandidateFile {
        CandidateFile::new("statement-2025-03.pdf", MIME_PDF, 2 * MB)
    }

    pub fn email_screenshot() -> CandidateFile {
        CandidateFile::new("notice.png", MIME_PNG, MB)
    }

    /// 3 MB screen recording
    pub fn video_clip() -> CandidateFile {
        CandidateFile::new("analytics.mp4", MIME_MP4, 3 * MB)
    }

    /// A type no slot accepts
    pub fn animated_gif() -> CandidateFile {
        CandidateFile::new("reaction.gif", "image/gif", MB)
    }
}
