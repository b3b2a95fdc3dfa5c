//! Review summary shown on the final step

use serde::Serialize;

use crate::draft::ClaimDraft;
use crate::steps::StepDefinition;

/// One labelled value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
}

/// The lines of one data-entry step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub title: String,
    pub lines: Vec<SummaryLine>,
}

/// Read-only rendering of the draft for the claimant to check before
/// confirming. Empty optional fields are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub sections: Vec<SummarySection>,
}

impl ReviewSummary {
    pub fn build(draft: &ClaimDraft, steps: &[StepDefinition]) -> Self {
        let sections = steps
            .iter()
            .filter_map(|step| {
                let section = draft.section(step.kind)?;
                let fields = step.fields.iter().map(|field| (field.name, field.label));
                let arrays = step.arrays.iter().map(|array| (array.id.field_name(), array.label));

                let lines = fields
                    .chain(arrays)
                    .filter_map(|(name, label)| {
                        let value = section.get(name).filter(|value| !value.is_empty())?;
                        Some(SummaryLine {
                            label: label.to_string(),
                            value: value.to_string(),
                        })
                    })
                    .collect();

                Some(SummarySection {
                    title: step.kind.title().to_string(),
                    lines,
                })
            })
            .collect();

        Self { sections }
    }

    /// Looks up a rendered value by its label
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|section| section.lines.iter())
            .find(|line| line.label == label)
            .map(|line| line.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntakeConfig;
    use crate::steps::{claim_steps, StepKind};
    use crate::value::FieldValue;

    #[test]
    fn test_summary_skips_empty_fields_and_review_step() {
        let steps = claim_steps(&IntakeConfig::default());
        let mut draft = ClaimDraft::new();
        draft.incident.insert("platform".to_string(), FieldValue::from("youtube"));
        draft.incident.insert("otherPlatform".to_string(), FieldValue::Empty);
        draft.incident.insert("incidentDuration".to_string(), FieldValue::from(7i64));

        let summary = ReviewSummary::build(&draft, &steps);
        assert_eq!(summary.sections.len(), 3);
        assert_eq!(summary.sections[0].title, StepKind::Incident.title());
        assert_eq!(summary.value_of("Platform"), Some("youtube"));
        assert_eq!(summary.value_of("Duration (days)"), Some("7"));
        assert_eq!(summary.value_of("Other platform"), None);
    }
}
