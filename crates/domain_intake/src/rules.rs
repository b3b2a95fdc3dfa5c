//! Declarative validation rules
//!
//! Every step describes its fields as data (`name`, `rules`, `default`) and
//! the single [`validate`] function evaluates them. Nothing here knows about
//! any particular step.
//!
//! # Rule kinds
//!
//! | rule | fails when |
//! |------|-----------|
//! | `Required` | value is empty (no value, blank text, empty list) |
//! | `Min` / `Max` | numeric value outside the inclusive bound |
//! | `Pattern` | text does not match the regex |
//! | `MaxLength` | text longer than the limit (characters) |
//! | `OneOf` | text, or any list item, not among the options |
//! | `Date` | text is not a `YYYY-MM-DD` date |
//! | `File` | value is not a file, or its type or size breaks the slot's limits |
//! | `Custom` | the predicate returns a message |
//!
//! All rules except `Required` and `Custom` pass on empty values, so an
//! optional field is only checked once something has been entered.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evidence::SlotKind;
use crate::value::{FieldValue, Record};

/// Matches evidence links; only http and https are accepted
pub static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("static URL pattern is valid"));

/// A field-scoped validation failure, shown inline next to the field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

type Predicate = dyn Fn(&FieldValue, &Record) -> Option<String> + Send + Sync;

/// Cross-field check. Receives the field value and the surrounding record
/// (the step's values layered over the draft).
#[derive(Clone)]
pub struct CustomRule {
    name: &'static str,
    predicate: Arc<Predicate>,
}

impl CustomRule {
    pub fn new<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&FieldValue, &Record) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn check(&self, value: &FieldValue, context: &Record) -> Option<String> {
        (self.predicate)(value, context)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule").field("name", &self.name).finish()
    }
}

/// A single declarative rule attached to a field
#[derive(Debug, Clone)]
pub enum Rule {
    Required { message: String },
    Min { limit: Decimal, message: String },
    Max { limit: Decimal, message: String },
    Pattern { regex: Regex, message: String },
    MaxLength { limit: usize, message: String },
    OneOf { options: Vec<String>, message: String },
    Date { message: String },
    File { slot: SlotKind, max_bytes: u64, message: String },
    Custom(CustomRule),
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required { message: message.into() }
    }

    pub fn min(limit: impl Into<Decimal>, message: impl Into<String>) -> Self {
        Rule::Min {
            limit: limit.into(),
            message: message.into(),
        }
    }

    pub fn max(limit: impl Into<Decimal>, message: impl Into<String>) -> Self {
        Rule::Max {
            limit: limit.into(),
            message: message.into(),
        }
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Rule::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn max_length(limit: usize, message: impl Into<String>) -> Self {
        Rule::MaxLength {
            limit,
            message: message.into(),
        }
    }

    pub fn one_of<I, S>(options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::OneOf {
            options: options.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn date(message: impl Into<String>) -> Self {
        Rule::Date { message: message.into() }
    }

    /// Accepts only a file value that fits `slot` (type) and `max_bytes`
    pub fn file(slot: SlotKind, max_bytes: u64, message: impl Into<String>) -> Self {
        Rule::File {
            slot,
            max_bytes,
            message: message.into(),
        }
    }

    pub fn custom<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&FieldValue, &Record) -> Option<String> + Send + Sync + 'static,
    {
        Rule::Custom(CustomRule::new(name, predicate))
    }

    /// Requires the field only while `other` holds the text `equals`
    /// (e.g. warning details once prior warnings is `yes`).
    pub fn required_when(
        other: &'static str,
        equals: &'static str,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Rule::custom("required_when", move |value, context| {
            let triggered = context
                .get(other)
                .and_then(FieldValue::as_text)
                .is_some_and(|text| text == equals);
            (triggered && value.is_empty()).then(|| message.clone())
        })
    }

    /// Rejects a list that holds the same text twice
    pub fn distinct(message: impl Into<String>) -> Self {
        let message = message.into();
        Rule::custom("distinct", move |value, _| {
            let entries = value.as_list()?;
            let mut seen = HashSet::new();
            let repeated = entries
                .iter()
                .filter_map(|entry| entry.value.as_text())
                .any(|text| !seen.insert(text));
            repeated.then(|| message.clone())
        })
    }

    /// Requires a checked box
    pub fn accepted(message: impl Into<String>) -> Self {
        let message = message.into();
        Rule::custom("accepted", move |value, _| {
            (value.as_bool() != Some(true)).then(|| message.clone())
        })
    }

    /// Rejects dates after today
    pub fn not_in_future(message: impl Into<String>) -> Self {
        let message = message.into();
        Rule::custom("not_in_future", move |value, _| {
            let today = Utc::now().date_naive();
            value
                .as_date()
                .filter(|date| *date > today)
                .map(|_| message.clone())
        })
    }

    /// Evaluates this rule, returning the failure message if it does not hold
    fn check(&self, value: &FieldValue, context: &Record) -> Option<String> {
        match self {
            Rule::Required { message } => value.is_empty().then(|| message.clone()),
            Rule::Custom(custom) => custom.check(value, context),
            _ if value.is_empty() => None,
            Rule::Min { limit, message } => match value.as_number() {
                Some(number) if number >= *limit => None,
                _ => Some(message.clone()),
            },
            Rule::Max { limit, message } => match value.as_number() {
                Some(number) if number <= *limit => None,
                _ => Some(message.clone()),
            },
            Rule::Pattern { regex, message } => match value.as_text() {
                Some(text) if regex.is_match(text) => None,
                _ => Some(message.clone()),
            },
            Rule::MaxLength { limit, message } => match value.as_text() {
                Some(text) if text.chars().count() > *limit => Some(message.clone()),
                _ => None,
            },
            Rule::OneOf { options, message } => {
                let allowed = |text: &str| options.iter().any(|option| option == text);
                let ok = match value {
                    FieldValue::Text(text) => allowed(text),
                    FieldValue::List(entries) => entries
                        .iter()
                        .all(|entry| entry.value.as_text().is_some_and(allowed)),
                    _ => false,
                };
                (!ok).then(|| message.clone())
            }
            Rule::Date { message } => value.as_date().is_none().then(|| message.clone()),
            Rule::File {
                slot,
                max_bytes,
                message,
            } => match value.as_file() {
                Some(file)
                    if file.size_bytes <= *max_bytes
                        && slot.allowed_types().contains(&file.mime_type.as_str()) =>
                {
                    None
                }
                _ => Some(message.clone()),
            },
        }
    }
}

/// Validates one field against its rules. The first failing rule wins.
///
/// # Arguments
///
/// * `field` - Field name, used to key the error
/// * `value` - Current value of the field
/// * `rules` - Declared rules, evaluated in order
/// * `context` - Surrounding values for custom cross-field rules
pub fn validate(
    field: &str,
    value: &FieldValue,
    rules: &[Rule],
    context: &Record,
) -> Option<ValidationError> {
    rules
        .iter()
        .find_map(|rule| rule.check(value, context))
        .map(|message| ValidationError::new(field, message))
}
