//! Tests for the validation rule engine and the declared claim steps

use chrono::{Days, Utc};
use proptest::prelude::*;

use domain_intake::rules::HTTP_URL;
use domain_intake::steps::{account_step, incident_step};
use domain_intake::{validate, FieldValue, IntakeConfig, Record, Rule, StepForm};

use test_utils::{
    assert_error_keys, assert_step_valid, decimal_strategy, fill, invalid_url_strategy,
    valid_url_strategy, IncidentInputBuilder, IntakeFixtures,
};

const INCIDENT_REQUIRED: [&str; 9] = [
    "incidentDate",
    "platform",
    "incidentType",
    "incidentDuration",
    "audienceSize",
    "priorWarnings",
    "platformCommunication",
    "affectedContent",
    "description",
];

fn submit_incident(values: &Record) -> domain_intake::StepResult {
    let mut form = StepForm::new(incident_step(&IntakeConfig::default()));
    fill(&mut form, values);
    form.submit_step(&Record::new())
}

// ============================================================================
// Incident Step Tests
// ============================================================================

mod incident_step_tests {
    use super::*;

    #[test]
    fn test_fixture_incident_is_valid() {
        assert_step_valid(&submit_incident(&IntakeFixtures::incident_values()));
    }

    #[test]
    fn test_future_incident_date_is_rejected() {
        let tomorrow = Utc::now().date_naive() + Days::new(1);
        let input = IncidentInputBuilder::new()
            .with("incidentDate", tomorrow.format("%Y-%m-%d").to_string())
            .build();

        let result = submit_incident(&input);
        assert_error_keys(&result, &["incidentDate"]);
        assert_eq!(
            result.errors["incidentDate"],
            "Incident date cannot be in the future"
        );
    }

    #[test]
    fn test_malformed_incident_date_is_rejected() {
        let input = IncidentInputBuilder::new().with("incidentDate", "01/04/2025").build();
        let result = submit_incident(&input);
        assert_eq!(result.errors["incidentDate"], "Enter the date as YYYY-MM-DD");
    }

    #[test]
    fn test_other_platform_required_only_for_other() {
        let result = submit_incident(&IncidentInputBuilder::new().with_platform("other").build());
        assert_error_keys(&result, &["otherPlatform"]);

        let input = IncidentInputBuilder::new()
            .with_platform("other")
            .with("otherPlatform", "Kick")
            .build();
        assert_step_valid(&submit_incident(&input));
    }

    #[test]
    fn test_other_incident_type_required_only_for_other() {
        let result = submit_incident(&IncidentInputBuilder::new().with_incident_type("other").build());
        assert_error_keys(&result, &["otherIncidentType"]);
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let result = submit_incident(&IncidentInputBuilder::new().with_platform("myspace").build());
        assert_eq!(result.errors["platform"], "Select a supported platform");
    }

    #[test]
    fn test_zero_day_duration_is_rejected() {
        let input = IncidentInputBuilder::new().with("incidentDuration", 0i64).build();
        assert_error_keys(&submit_incident(&input), &["incidentDuration"]);
    }

    #[test]
    fn test_description_over_limit() {
        let input = IncidentInputBuilder::new().with_description("x".repeat(1001)).build();
        assert_error_keys(&submit_incident(&input), &["description"]);
    }

    #[test]
    fn test_numeric_text_input_is_accepted() {
        let input = IncidentInputBuilder::new()
            .with("incidentDuration", "14")
            .with("audienceSize", "1200")
            .build();
        assert_step_valid(&submit_incident(&input));
    }
}

// ============================================================================
// Account Step Tests
// ============================================================================

mod account_step_tests {
    use super::*;

    fn account_form() -> StepForm {
        StepForm::new(account_step(&IntakeConfig::default()))
    }

    #[test]
    fn test_bank_statement_is_required() {
        let mut form = account_form();
        fill(&mut form, &IntakeFixtures::account_values());
        assert_error_keys(&form.submit_step(&Record::new()), &["bankStatement"]);
    }

    #[test]
    fn test_penalty_details_required_after_penalty() {
        let mut form = account_form();
        fill(&mut form, &IntakeFixtures::account_values());
        form.set("penaltyHistory", "yes");
        let result = form.submit_step(&Record::new());
        assert!(result.errors.contains_key("penaltyDetails"));
    }

    #[test]
    fn test_unknown_income_source_is_rejected() {
        let mut form = account_form();
        form.set("incomeSources", FieldValue::text_list(["ad_revenue", "crypto"]));
        assert_eq!(form.blur("incomeSources", &Record::new()), Some("Unknown income source"));
    }

    #[test]
    fn test_repeated_income_source_is_rejected() {
        let mut form = account_form();
        form.set("incomeSources", FieldValue::text_list(["ad_revenue", "ad_revenue"]));
        assert_eq!(
            form.blur("incomeSources", &Record::new()),
            Some("Select each income source only once")
        );
    }

    #[test]
    fn test_bank_statement_must_be_a_file() {
        let mut form = account_form();
        fill(&mut form, &IntakeFixtures::account_values());
        form.set("bankStatement", "statement.pdf");

        let result = form.submit_step(&Record::new());
        assert_error_keys(&result, &["bankStatement"]);
        assert_eq!(
            result.errors.get("bankStatement").map(String::as_str),
            Some("Bank statement must be a JPEG, PNG or PDF within the size limit")
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn error_keys_equal_missing_required_fields(mask in prop::collection::vec(any::<bool>(), 9)) {
            let mut builder = IncidentInputBuilder::new();
            let mut missing = Vec::new();
            for (field, drop) in INCIDENT_REQUIRED.iter().zip(&mask) {
                if *drop {
                    builder = builder.without(field);
                    missing.push(*field);
                }
            }

            let result = submit_incident(&builder.build());
            let mut keys: Vec<&str> = result.errors.keys().map(String::as_str).collect();
            keys.sort_unstable();
            missing.sort_unstable();
            prop_assert_eq!(result.valid, missing.is_empty());
            prop_assert_eq!(keys, missing);
        }

        #[test]
        fn min_max_bounds_are_inclusive(value in decimal_strategy(), low in decimal_strategy(), high in decimal_strategy()) {
            let rules = [Rule::min(low, "low"), Rule::max(high, "high")];
            let error = validate("amount", &FieldValue::Number(value), &rules, &Record::new());
            let expected = if value < low {
                Some("low")
            } else if value > high {
                Some("high")
            } else {
                None
            };
            prop_assert_eq!(error.as_ref().map(|e| e.message.as_str()), expected);
        }

        #[test]
        fn http_links_pass_url_rule(url in valid_url_strategy()) {
            prop_assert!(HTTP_URL.is_match(&url));
        }

        #[test]
        fn scheme_less_links_fail_url_rule(url in invalid_url_strategy()) {
            let rules = [Rule::pattern(HTTP_URL.clone(), "bad link")];
            prop_assert!(validate("link", &FieldValue::from(url), &rules, &Record::new()).is_some());
        }
    }
}
