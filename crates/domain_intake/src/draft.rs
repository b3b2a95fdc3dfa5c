//! Claim draft aggregate
//!
//! The draft accumulates the validated output of each step. It is owned
//! by the wizard alone; steps only ever see a read-only copy of it.
//!
//! # Invariants
//!
//! - Merging a step overwrites only the keys that step owns
//! - A step's merged keys change only when that step is submitted again
//! - Any change to a data-entry step withdraws the claimant's confirmation

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DraftId, FileId};

use crate::steps::{StepDefinition, StepKind};
use crate::value::{FieldValue, Record};

/// The cumulative claim record spanning all steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDraft {
    /// Session identifier
    pub id: DraftId,
    /// Incident details
    pub incident: Record,
    /// Account and financial information
    pub account: Record,
    /// Evidence references and notes
    pub evidence: Record,
    /// Claimant confirmed the information is accurate
    pub confirmed: bool,
    /// When the wizard was opened
    pub created_at: DateTime<Utc>,
}

impl ClaimDraft {
    pub fn new() -> Self {
        Self {
            id: DraftId::new_v7(),
            incident: Record::new(),
            account: Record::new(),
            evidence: Record::new(),
            confirmed: false,
            created_at: Utc::now(),
        }
    }

    /// Stored values of a data-entry step; the review step has none
    pub fn section(&self, step: StepKind) -> Option<&Record> {
        match step {
            StepKind::Incident => Some(&self.incident),
            StepKind::Account => Some(&self.account),
            StepKind::Evidence => Some(&self.evidence),
            StepKind::Review => None,
        }
    }

    fn section_mut(&mut self, step: StepKind) -> Option<&mut Record> {
        match step {
            StepKind::Incident => Some(&mut self.incident),
            StepKind::Account => Some(&mut self.account),
            StepKind::Evidence => Some(&mut self.evidence),
            StepKind::Review => None,
        }
    }

    /// Values used to pre-fill a step when it is (re)entered
    pub fn defaults_for(&self, step: StepKind) -> Record {
        match self.section(step) {
            Some(section) => section.clone(),
            None => Record::from([("confirmed".to_string(), FieldValue::Bool(self.confirmed))]),
        }
    }

    /// Shallow-merges a step's values, writing only keys the step owns.
    /// Returns true if any stored value changed.
    pub fn merge(&mut self, definition: &StepDefinition, values: &Record) -> bool {
        let owned = values
            .iter()
            .filter(|(key, _)| definition.owns(key.as_str()));

        if definition.kind == StepKind::Review {
            if let Some((_, value)) = owned.into_iter().find(|(key, _)| key.as_str() == "confirmed") {
                let confirmed = value.as_bool().unwrap_or(false);
                let changed = confirmed != self.confirmed;
                self.confirmed = confirmed;
                return changed;
            }
            return false;
        }

        let mut changed = false;
        if let Some(section) = self.section_mut(definition.kind) {
            for (key, value) in owned {
                let previous = section.insert(key.clone(), value.clone());
                changed |= previous.as_ref() != Some(value);
            }
        }
        if changed && self.confirmed {
            self.confirmed = false;
        }
        changed
    }

    /// All sections flattened into one record, for cross-field rules
    pub fn flatten(&self) -> Record {
        let mut record = Record::new();
        for section in [&self.incident, &self.account, &self.evidence] {
            record.extend(section.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        record.insert("confirmed".to_string(), FieldValue::Bool(self.confirmed));
        record
    }

    /// Ids of every file the draft references
    pub fn referenced_files(&self) -> HashSet<FileId> {
        [&self.incident, &self.account, &self.evidence]
            .into_iter()
            .flat_map(|section| section.values())
            .flat_map(FieldValue::files)
            .map(|file| file.id)
            .collect()
    }
}

impl Default for ClaimDraft {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntakeConfig;
    use crate::steps::{incident_step, review_step};

    #[test]
    fn test_merge_ignores_foreign_keys() {
        let mut draft = ClaimDraft::new();
        let step = incident_step(&IntakeConfig::default());
        let mut values = Record::new();
        values.insert("platform".to_string(), FieldValue::from("youtube"));
        values.insert("bankName".to_string(), FieldValue::from("Sneaky Bank"));

        draft.merge(&step, &values);
        assert_eq!(draft.incident.get("platform"), Some(&FieldValue::from("youtube")));
        assert!(!draft.incident.contains_key("bankName"));
        assert!(draft.account.is_empty());
    }

    #[test]
    fn test_merge_review_sets_confirmed() {
        let mut draft = ClaimDraft::new();
        let values = Record::from([("confirmed".to_string(), FieldValue::Bool(true))]);
        draft.merge(&review_step(), &values);
        assert!(draft.confirmed);
        assert_eq!(draft.defaults_for(StepKind::Review).get("confirmed"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_merge_overwrites_only_submitted_keys() {
        let mut draft = ClaimDraft::new();
        let step = incident_step(&IntakeConfig::default());
        draft.merge(&step, &Record::from([
            ("platform".to_string(), FieldValue::from("youtube")),
            ("description".to_string(), FieldValue::from("first")),
        ]));
        draft.merge(&step, &Record::from([("description".to_string(), FieldValue::from("second"))]));

        assert_eq!(draft.incident.get("platform"), Some(&FieldValue::from("youtube")));
        assert_eq!(draft.incident.get("description"), Some(&FieldValue::from("second")));
    }

    #[test]
    fn test_changed_step_withdraws_confirmation() {
        let mut draft = ClaimDraft::new();
        let step = incident_step(&IntakeConfig::default());
        let values = Record::from([("platform".to_string(), FieldValue::from("youtube"))]);
        draft.merge(&step, &values);
        draft.merge(&review_step(), &Record::from([("confirmed".to_string(), FieldValue::Bool(true))]));

        // Same values again: nothing to re-confirm
        assert!(!draft.merge(&step, &values));
        assert!(draft.confirmed);

        let edited = Record::from([("platform".to_string(), FieldValue::from("tiktok"))]);
        assert!(draft.merge(&step, &edited));
        assert!(!draft.confirmed);
    }
}
