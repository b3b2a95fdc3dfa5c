//! Field values held by step forms and the claim draft

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{EntryId, FileId};

/// Field name to value mapping. Ordered so merged drafts compare and
/// serialize deterministically.
pub type Record = BTreeMap<String, FieldValue>;

/// A value entered into a wizard field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Nothing entered yet
    #[default]
    Empty,
    /// Free text or a selected option
    Text(String),
    /// Numeric input
    Number(Decimal),
    /// Checkbox input
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Repeatable group (field array entries or a multi-select)
    List(Vec<ListEntry>),
    /// A staged evidence file
    File(FileRef),
}

/// One element of a list value, keyed by a stable entry id so that
/// per-entry resources survive reordering after removals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: EntryId,
    pub value: FieldValue,
}

impl ListEntry {
    pub fn new(value: FieldValue) -> Self {
        Self {
            id: EntryId::new(),
            value,
        }
    }
}

/// Reference to a file staged by the evidence manager
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    /// Identifier assigned at staging time
    pub id: FileId,
    /// Original file name
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl FieldValue {
    /// Builds a list value from plain text items (multi-select inputs)
    pub fn text_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(
            items
                .into_iter()
                .map(|item| ListEntry::new(FieldValue::Text(item.into())))
                .collect(),
        )
    }

    /// Returns true for values the `required` rule rejects: no value,
    /// blank text, or an empty list. Booleans, numbers and files are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(entries) => entries.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) | FieldValue::Date(_) | FieldValue::File(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Numeric view; text is parsed so that raw form input can be bounded
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Date view; text is parsed as `YYYY-MM-DD`
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            FieldValue::Text(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ListEntry]> {
        match self {
            FieldValue::List(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            FieldValue::File(file) => Some(file),
            _ => None,
        }
    }

    /// Collects every file referenced by this value, including list entries
    pub fn files(&self) -> Vec<&FileRef> {
        match self {
            FieldValue::File(file) => vec![file],
            FieldValue::List(entries) => entries.iter().flat_map(|e| e.value.files()).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => write!(f, "Not provided"),
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Number(number) => write!(f, "{}", number.normalize()),
            FieldValue::Bool(true) => write!(f, "Yes"),
            FieldValue::Bool(false) => write!(f, "No"),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::List(entries) => {
                let items: Vec<String> = entries
                    .iter()
                    .filter(|e| !e.value.is_empty())
                    .map(|e| e.value.to_string())
                    .collect();
                if items.is_empty() {
                    write!(f, "None")
                } else {
                    write!(f, "{}", items.join(", "))
                }
            }
            FieldValue::File(file) => write!(f, "{} ({} KB)", file.name, file.size_bytes.div_ceil(1024)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(Decimal::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(value)
    }
}
