//! Step form controller
//!
//! A `StepForm` holds the editable values of one wizard step. It validates
//! on request (submit or blur), never continuously, and reports a
//! [`StepResult`]. It never advances the wizard itself.
//!
//! ```text
//! Editing -> Validating -> Complete
//!               \
//!                -> Editing (errors attached)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FieldArrayError;
use crate::field_array::{ArrayDeclaration, ArrayId, FieldArray, FieldArrays};
use crate::rules::{validate, Rule};
use crate::steps::{StepDefinition, StepKind};
use crate::value::{FieldValue, Record};

/// Declares one field of a step
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub name: &'static str,
    pub label: &'static str,
    pub rules: Vec<Rule>,
    pub default_value: FieldValue,
}

impl FieldDeclaration {
    pub fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            rules: Vec::new(),
            default_value: FieldValue::Empty,
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = value.into();
        self
    }
}

/// Outcome of submitting a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Step that produced the result
    pub step: StepKind,
    /// True when no field violated a rule
    pub valid: bool,
    /// Values of the fields the step owns
    pub values: Record,
    /// Violating field name to message
    pub errors: BTreeMap<String, String>,
}

/// Lifecycle of a step form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepPhase {
    Editing,
    Validating,
    Complete,
}

/// Editable state of one wizard step
#[derive(Debug, Clone)]
pub struct StepForm {
    definition: StepDefinition,
    values: Record,
    arrays: FieldArrays,
    errors: BTreeMap<String, String>,
    phase: StepPhase,
}

impl StepForm {
    /// Creates a form holding the declared defaults
    pub fn new(definition: StepDefinition) -> Self {
        let mut form = Self {
            definition,
            values: Record::new(),
            arrays: FieldArrays::new(),
            errors: BTreeMap::new(),
            phase: StepPhase::Editing,
        };
        form.initialize(&Record::new());
        form
    }

    /// Resets the form to its declared defaults overlaid with `defaults`.
    /// Keys the step does not own are ignored.
    pub fn initialize(&mut self, defaults: &Record) {
        self.values = self
            .definition
            .fields
            .iter()
            .map(|field| {
                let value = defaults
                    .get(field.name)
                    .cloned()
                    .unwrap_or_else(|| field.default_value.clone());
                (field.name.to_string(), value)
            })
            .collect();

        self.arrays = FieldArrays::new();
        for declaration in &self.definition.arrays {
            let entries = defaults
                .get(declaration.id.field_name())
                .and_then(FieldValue::as_list)
                .map(<[_]>::to_vec)
                .unwrap_or_default();
            self.arrays
                .insert(FieldArray::from_entries(declaration.id, declaration.capacity, entries));
        }

        self.errors.clear();
        self.phase = StepPhase::Editing;
    }

    pub fn kind(&self) -> StepKind {
        self.definition.kind
    }

    pub fn definition(&self) -> &StepDefinition {
        &self.definition
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn arrays(&self) -> &FieldArrays {
        &self.arrays
    }

    pub fn arrays_mut(&mut self) -> &mut FieldArrays {
        self.edited();
        &mut self.arrays
    }

    /// Records user input. Fields the step does not declare are ignored.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        if !self.definition.declares(field) {
            debug!(step = %self.kind(), field, "Ignoring undeclared field");
            return;
        }
        self.values.insert(field.to_string(), value.into());
        self.edited();
    }

    /// Clears a field back to empty
    pub fn clear(&mut self, field: &str) {
        self.set(field, FieldValue::Empty);
    }

    /// Sets the value of one array entry
    pub fn set_entry(
        &mut self,
        array: ArrayId,
        index: usize,
        value: impl Into<FieldValue>,
    ) -> Result<(), FieldArrayError> {
        self.edited();
        self.arrays.get_mut(array)?.set(index, value.into())
    }

    /// Validates a single field (on blur) and updates its error.
    /// Returns the message if the field is invalid.
    pub fn blur(&mut self, field: &str, context: &Record) -> Option<&str> {
        let declaration = self.definition.field_declaration(field)?;
        let scope = self.scope(context);
        let value = self.values.get(field).cloned().unwrap_or_default();

        match validate(field, &value, &declaration.rules, &scope) {
            Some(error) => {
                self.errors.insert(error.field, error.message);
            }
            None => {
                self.errors.remove(field);
            }
        }
        self.error(field)
    }

    /// Validates every declared field and array entry
    ///
    /// # Arguments
    ///
    /// * `context` - Draft values from earlier steps, visible to custom rules
    ///
    /// # Returns
    ///
    /// A `StepResult` whose `errors` keys are exactly the violating fields
    /// (array entries as `arrayId.index`) and whose `values` hold every key
    /// the step owns.
    pub fn submit_step(&mut self, context: &Record) -> StepResult {
        self.phase = StepPhase::Validating;
        let scope = self.scope(context);
        let mut errors = BTreeMap::new();

        for field in &self.definition.fields {
            let value = self.values.get(field.name).cloned().unwrap_or_default();
            if let Some(error) = validate(field.name, &value, &field.rules, &scope) {
                errors.insert(error.field, error.message);
            }
        }

        for declaration in &self.definition.arrays {
            if let Ok(array) = self.arrays.get(declaration.id) {
                errors.extend(validate_entries(declaration, array, &scope));
            }
        }

        let valid = errors.is_empty();
        self.errors = errors.clone();
        self.phase = if valid { StepPhase::Complete } else { StepPhase::Editing };
        debug!(step = %self.kind(), valid, error_count = errors.len(), "Step submitted");

        StepResult {
            step: self.kind(),
            valid,
            values: self.owned_values(),
            errors,
        }
    }

    /// Values of every key this step owns, arrays included
    pub fn owned_values(&self) -> Record {
        let mut values = self.values.clone();
        for array in self.arrays.iter() {
            values.insert(array.id().field_name().to_string(), array.to_value());
        }
        values
    }

    /// Context for custom rules: draft values overlaid with this step's
    fn scope(&self, context: &Record) -> Record {
        let mut scope = context.clone();
        scope.extend(self.owned_values());
        scope
    }

    fn edited(&mut self) {
        if self.phase == StepPhase::Complete {
            self.phase = StepPhase::Editing;
        }
    }
}

fn validate_entries(
    declaration: &ArrayDeclaration,
    array: &FieldArray,
    scope: &Record,
) -> Vec<(String, String)> {
    array
        .values()
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let key = declaration.entry_key(index);
            validate(&key, &entry.value, &declaration.item_rules, scope)
                .map(|error| (error.field, error.message))
        })
        .collect()
}
