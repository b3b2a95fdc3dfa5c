//! Step declarations for the claim wizard
//!
//! Each step is configured as data: its fields with their rules and
//! defaults, and its field arrays. The same rule engine validates all of them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::IntakeConfig;
use crate::evidence::SlotKind;
use crate::field_array::{ArrayDeclaration, ArrayId};
use crate::rules::{Rule, HTTP_URL};
use crate::step_form::FieldDeclaration;

/// Pages of the claim wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepKind {
    Incident,
    Account,
    Evidence,
    Review,
}

impl StepKind {
    pub fn title(&self) -> &'static str {
        match self {
            StepKind::Incident => "Incident Details",
            StepKind::Account => "Account & Financial Information",
            StepKind::Evidence => "Evidence",
            StepKind::Review => "Review & Submit",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Fields and arrays owned by one step
#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub kind: StepKind,
    pub fields: Vec<FieldDeclaration>,
    pub arrays: Vec<ArrayDeclaration>,
}

impl StepDefinition {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            arrays: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    pub fn array(mut self, array: ArrayDeclaration) -> Self {
        self.arrays.push(array);
        self
    }

    /// Looks up a plain (non-array) field declaration
    pub fn field_declaration(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn array_declaration(&self, id: ArrayId) -> Option<&ArrayDeclaration> {
        self.arrays.iter().find(|array| array.id == id)
    }

    /// True for plain fields; arrays are edited through the array API
    pub fn declares(&self, name: &str) -> bool {
        self.field_declaration(name).is_some()
    }

    /// True if `name` is a field or array of this step
    pub fn owns(&self, name: &str) -> bool {
        self.declares(name) || self.arrays.iter().any(|array| array.id.field_name() == name)
    }

    /// Every key the step writes into the draft
    pub fn owned_keys(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|field| field.name)
            .chain(self.arrays.iter().map(|array| array.id.field_name()))
            .collect()
    }
}

pub const PLATFORMS: &[&str] = &["youtube", "tiktok", "instagram", "facebook", "twitter", "twitch", "other"];
pub const INCIDENT_TYPES: &[&str] = &[
    "demonetization",
    "suspension",
    "ban",
    "content_removal",
    "shadowban",
    "other",
];
pub const COMMUNICATION_CHANNELS: &[&str] = &["email", "in_app", "dashboard", "none"];
pub const INCOME_SOURCES: &[&str] = &[
    "ad_revenue",
    "sponsorships",
    "affiliate",
    "merchandise",
    "subscriptions",
    "donations",
    "other",
];
pub const YES_NO: &[&str] = &["yes", "no"];

/// The four claim steps in order, sized from configuration
pub fn claim_steps(config: &IntakeConfig) -> Vec<StepDefinition> {
    vec![
        incident_step(config),
        account_step(config),
        evidence_step(config),
        review_step(),
    ]
}

pub fn incident_step(config: &IntakeConfig) -> StepDefinition {
    let max_text = config.max_text_length;
    StepDefinition::new(StepKind::Incident)
        .field(
            FieldDeclaration::new("incidentDate", "Incident date")
                .rule(Rule::required("Incident date is required"))
                .rule(Rule::date("Enter the date as YYYY-MM-DD"))
                .rule(Rule::not_in_future("Incident date cannot be in the future")),
        )
        .field(
            FieldDeclaration::new("platform", "Platform")
                .rule(Rule::required("Platform is required"))
                .rule(Rule::one_of(PLATFORMS.iter().copied(), "Select a supported platform")),
        )
        .field(
            FieldDeclaration::new("otherPlatform", "Other platform")
                .rule(Rule::required_when("platform", "other", "Name the platform"))
                .rule(Rule::max_length(100, "Platform name must be 100 characters or fewer")),
        )
        .field(
            FieldDeclaration::new("incidentType", "Incident type")
                .rule(Rule::required("Incident type is required"))
                .rule(Rule::one_of(INCIDENT_TYPES.iter().copied(), "Select an incident type")),
        )
        .field(
            FieldDeclaration::new("otherIncidentType", "Other incident type")
                .rule(Rule::required_when("incidentType", "other", "Describe the incident type"))
                .rule(Rule::max_length(100, "Incident type must be 100 characters or fewer")),
        )
        .field(
            FieldDeclaration::new("incidentDuration", "Duration (days)")
                .rule(Rule::required("Duration is required"))
                .rule(Rule::min(1, "Duration must be at least 1 day")),
        )
        .field(
            FieldDeclaration::new("audienceSize", "Audience size")
                .rule(Rule::required("Audience size is required"))
                .rule(Rule::min(0, "Audience size cannot be negative")),
        )
        .field(
            FieldDeclaration::new("priorWarnings", "Prior warnings")
                .rule(Rule::required("Tell us whether you received prior warnings"))
                .rule(Rule::one_of(YES_NO.iter().copied(), "Answer yes or no")),
        )
        .field(
            FieldDeclaration::new("warningDetails", "Warning details")
                .rule(Rule::required_when("priorWarnings", "yes", "Describe the warnings you received"))
                .rule(Rule::max_length(max_text, format!("Keep warning details under {} characters", max_text))),
        )
        .field(
            FieldDeclaration::new("platformCommunication", "Platform communication")
                .rule(Rule::required("Tell us how the platform contacted you"))
                .rule(Rule::one_of(COMMUNICATION_CHANNELS.iter().copied(), "Select a communication channel")),
        )
        .field(
            FieldDeclaration::new("affectedContent", "Affected content")
                .rule(Rule::required("List the affected content"))
                .rule(Rule::max_length(max_text, format!("Keep this under {} characters", max_text))),
        )
        .field(
            FieldDeclaration::new("description", "Description")
                .rule(Rule::required("Describe what happened"))
                .rule(Rule::max_length(max_text, format!("Keep the description under {} characters", max_text))),
        )
}

pub fn account_step(config: &IntakeConfig) -> StepDefinition {
    StepDefinition::new(StepKind::Account)
        .field(
            FieldDeclaration::new("primaryPlatform", "Primary platform")
                .rule(Rule::required("Primary platform is required"))
                .rule(Rule::one_of(PLATFORMS.iter().copied(), "Select a supported platform")),
        )
        .field(
            FieldDeclaration::new("primaryHandle", "Primary handle")
                .rule(Rule::required("Account handle is required"))
                .rule(Rule::max_length(100, "Handle must be 100 characters or fewer")),
        )
        .field(
            FieldDeclaration::new("additionalPlatforms", "Additional platforms")
                .rule(Rule::max_length(config.max_text_length, "Too many additional platforms listed")),
        )
        .field(
            FieldDeclaration::new("monthlyEarnings", "Monthly earnings")
                .rule(Rule::required("Monthly earnings are required"))
                .rule(Rule::min(0, "Earnings cannot be negative")),
        )
        .field(
            FieldDeclaration::new("incomeSources", "Income sources")
                .rule(Rule::required("Select at least one income source"))
                .rule(Rule::one_of(INCOME_SOURCES.iter().copied(), "Unknown income source"))
                .rule(Rule::distinct("Select each income source only once")),
        )
        .field(
            FieldDeclaration::new("bankStatement", "Bank statement")
                .rule(Rule::required("Upload a recent bank statement"))
                .rule(Rule::file(
                    SlotKind::BankStatement,
                    config.max_file_bytes,
                    "Bank statement must be a JPEG, PNG or PDF within the size limit",
                )),
        )
        .field(
            FieldDeclaration::new("bankAccount", "Bank account number")
                .rule(Rule::required("Bank account number is required"))
                .rule(Rule::max_length(34, "Account number must be 34 characters or fewer")),
        )
        .field(
            FieldDeclaration::new("bankName", "Bank name")
                .rule(Rule::required("Bank name is required")),
        )
        .field(
            FieldDeclaration::new("bankBranch", "Bank branch")
                .rule(Rule::required("Bank branch is required")),
        )
        .field(
            FieldDeclaration::new("penaltyHistory", "Penalty history")
                .rule(Rule::required("Tell us whether your account was penalized before"))
                .rule(Rule::one_of(YES_NO.iter().copied(), "Answer yes or no")),
        )
        .field(
            FieldDeclaration::new("penaltyDetails", "Penalty details")
                .rule(Rule::required_when("penaltyHistory", "yes", "Describe the previous penalties"))
                .rule(Rule::max_length(config.max_text_length, "Penalty details are too long")),
        )
        .field(
            FieldDeclaration::new("yearsActive", "Years active")
                .rule(Rule::required("Years active is required"))
                .rule(Rule::min(0, "Years active cannot be negative")),
        )
}

pub fn evidence_step(config: &IntakeConfig) -> StepDefinition {
    let max_text = config.max_text_length;
    StepDefinition::new(StepKind::Evidence)
        .field(
            FieldDeclaration::new("accountScreenshot", "Account screenshot")
                .rule(Rule::required("Upload a screenshot of your account status"))
                .rule(Rule::file(
                    SlotKind::AccountScreenshot,
                    config.max_file_bytes,
                    "Account screenshot must be a JPEG or PNG within the size limit",
                )),
        )
        .field(
            FieldDeclaration::new("emailScreenshot", "Email screenshot").rule(Rule::file(
                SlotKind::EmailScreenshot,
                config.max_file_bytes,
                "Email screenshot must be a JPEG, PNG or PDF within the size limit",
            )),
        )
        .field(
            FieldDeclaration::new("emailMessage", "Email message")
                .rule(Rule::max_length(max_text, format!("Email message must be {} characters or fewer", max_text))),
        )
        .array(
            ArrayDeclaration::new(ArrayId::AdditionalFiles, "Additional files", config.additional_files_capacity)
                .item_rule(Rule::required("Choose a file or remove this entry"))
                .item_rule(Rule::file(
                    SlotKind::AdditionalFile,
                    config.max_file_bytes,
                    "Additional files must be images, MP4 videos or PDFs within the size limit",
                )),
        )
        .array(
            ArrayDeclaration::new(ArrayId::AdditionalUrls, "Additional links", config.additional_urls_capacity)
                .item_rule(Rule::required("Enter a link or remove this entry"))
                .item_rule(Rule::pattern(HTTP_URL.clone(), "Links must start with http:// or https://")),
        )
        .field(
            FieldDeclaration::new("additionalNotes", "Additional notes")
                .rule(Rule::max_length(max_text, format!("Notes must be {} characters or fewer", max_text))),
        )
}

pub fn review_step() -> StepDefinition {
    StepDefinition::new(StepKind::Review).field(
        FieldDeclaration::new("confirmed", "Information confirmed")
            .rule(Rule::accepted("Confirm that the information is accurate"))
            .default_value(false),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_steps_order() {
        let steps = claim_steps(&IntakeConfig::default());
        let kinds: Vec<_> = steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Incident, StepKind::Account, StepKind::Evidence, StepKind::Review]
        );
    }

    #[test]
    fn test_evidence_step_owns_arrays() {
        let step = evidence_step(&IntakeConfig::default());
        assert!(step.owns("additionalFiles"));
        assert!(step.owns("additionalUrls"));
        assert!(!step.declares("additionalUrls"));
        assert_eq!(step.array_declaration(ArrayId::AdditionalFiles).unwrap().capacity, 7);
        assert_eq!(step.array_declaration(ArrayId::AdditionalUrls).unwrap().capacity, 5);
    }

    #[test]
    fn test_every_file_field_checks_its_slot() {
        let config = IntakeConfig::default();
        let account = account_step(&config);
        let evidence = evidence_step(&config);
        for (step, field, expected) in [
            (&account, "bankStatement", SlotKind::BankStatement),
            (&evidence, "accountScreenshot", SlotKind::AccountScreenshot),
            (&evidence, "emailScreenshot", SlotKind::EmailScreenshot),
        ] {
            let declaration = step.field_declaration(field).unwrap();
            assert!(declaration
                .rules
                .iter()
                .any(|rule| matches!(rule, Rule::File { slot, .. } if *slot == expected)));
        }

        let files = evidence.array_declaration(ArrayId::AdditionalFiles).unwrap();
        assert!(files
            .item_rules
            .iter()
            .any(|rule| matches!(rule, Rule::File { slot: SlotKind::AdditionalFile, .. })));
    }

    #[test]
    fn test_every_conditional_field_has_a_rule() {
        let config = IntakeConfig::default();
        let incident = incident_step(&config);
        let account = account_step(&config);
        for (step, field) in [
            (&incident, "otherPlatform"),
            (&incident, "otherIncidentType"),
            (&incident, "warningDetails"),
            (&account, "penaltyDetails"),
        ] {
            let declaration = step.field_declaration(field).unwrap();
            assert!(declaration
                .rules
                .iter()
                .any(|rule| matches!(rule, Rule::Custom(custom) if custom.name() == "required_when")));
        }
    }
}
