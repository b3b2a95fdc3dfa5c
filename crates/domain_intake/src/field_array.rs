//! Bounded, insertion-ordered field arrays
//!
//! The evidence step lets the claimant add up to seven extra files and five
//! supporting links. Each array has a fixed capacity; appending beyond it is
//! rejected and leaves the array unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::EntryId;

use crate::error::FieldArrayError;
use crate::rules::Rule;
use crate::value::{FieldValue, ListEntry};

/// Identifies a repeatable group of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArrayId {
    AdditionalFiles,
    AdditionalUrls,
}

impl ArrayId {
    /// Field name the array is stored under in step values and the draft
    pub fn field_name(&self) -> &'static str {
        match self {
            ArrayId::AdditionalFiles => "additionalFiles",
            ArrayId::AdditionalUrls => "additionalUrls",
        }
    }
}

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Declares an array on a step: its capacity and the rules applied to
/// every entry independently
#[derive(Debug, Clone)]
pub struct ArrayDeclaration {
    pub id: ArrayId,
    pub label: &'static str,
    pub capacity: usize,
    pub item_rules: Vec<Rule>,
}

impl ArrayDeclaration {
    pub fn new(id: ArrayId, label: &'static str, capacity: usize) -> Self {
        Self {
            id,
            label,
            capacity,
            item_rules: Vec::new(),
        }
    }

    pub fn item_rule(mut self, rule: Rule) -> Self {
        self.item_rules.push(rule);
        self
    }

    /// Error key for the entry at `index`, e.g. `additionalUrls.2`
    pub fn entry_key(&self, index: usize) -> String {
        format!("{}.{}", self.id.field_name(), index)
    }
}

/// A single bounded array of entries
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray {
    id: ArrayId,
    capacity: usize,
    entries: Vec<ListEntry>,
}

impl FieldArray {
    pub fn new(id: ArrayId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            entries: Vec::new(),
        }
    }

    /// Rebuilds an array from stored entries, keeping their ids.
    /// Entries beyond the capacity are dropped.
    pub fn from_entries(id: ArrayId, capacity: usize, mut entries: Vec<ListEntry>) -> Self {
        if entries.len() > capacity {
            warn!(array = %id, len = entries.len(), capacity, "Truncating stored entries to capacity");
            entries.truncate(capacity);
        }
        Self { id, capacity, entries }
    }

    pub fn id(&self) -> ArrayId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Appends a blank entry
    pub fn append(&mut self) -> Result<EntryId, FieldArrayError> {
        self.append_value(FieldValue::Empty)
    }

    /// Appends an entry holding `value`
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` when the array is full; the array is left unchanged.
    pub fn append_value(&mut self, value: FieldValue) -> Result<EntryId, FieldArrayError> {
        if self.is_full() {
            warn!(array = %self.id, capacity = self.capacity, "Append rejected, array is full");
            return Err(FieldArrayError::CapacityExceeded {
                array: self.id,
                capacity: self.capacity,
            });
        }
        let entry = ListEntry::new(value);
        let id = entry.id;
        self.entries.push(entry);
        debug!(array = %self.id, len = self.entries.len(), "Entry appended");
        Ok(id)
    }

    /// Removes the entry at `index`; later entries shift down by one.
    ///
    /// The caller is expected to have confirmed the removal with the user
    /// and to release any evidence staged for the returned entry.
    pub fn remove(&mut self, index: usize) -> Result<ListEntry, FieldArrayError> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        debug!(array = %self.id, index, len = self.entries.len(), "Entry removed");
        Ok(removed)
    }

    /// Replaces the value of the entry at `index`, keeping its id
    pub fn set(&mut self, index: usize, value: FieldValue) -> Result<(), FieldArrayError> {
        self.check_index(index)?;
        self.entries[index].value = value;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&ListEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, entry: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == entry)
    }

    /// Entries in insertion order
    pub fn values(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Snapshot of the array as a list value
    pub fn to_value(&self) -> FieldValue {
        FieldValue::List(self.entries.clone())
    }

    fn check_index(&self, index: usize) -> Result<(), FieldArrayError> {
        if index >= self.entries.len() {
            return Err(FieldArrayError::IndexOutOfRange {
                array: self.id,
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

/// The arrays owned by one step, addressed by [`ArrayId`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldArrays {
    arrays: BTreeMap<ArrayId, FieldArray>,
}

impl FieldArrays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, array: FieldArray) {
        self.arrays.insert(array.id(), array);
    }

    pub fn get(&self, id: ArrayId) -> Result<&FieldArray, FieldArrayError> {
        self.arrays.get(&id).ok_or(FieldArrayError::UnknownArray(id))
    }

    pub fn get_mut(&mut self, id: ArrayId) -> Result<&mut FieldArray, FieldArrayError> {
        self.arrays.get_mut(&id).ok_or(FieldArrayError::UnknownArray(id))
    }

    pub fn append(&mut self, id: ArrayId) -> Result<EntryId, FieldArrayError> {
        self.get_mut(id)?.append()
    }

    pub fn remove(&mut self, id: ArrayId, index: usize) -> Result<ListEntry, FieldArrayError> {
        self.get_mut(id)?.remove(index)
    }

    pub fn values(&self, id: ArrayId) -> Result<&[ListEntry], FieldArrayError> {
        Ok(self.get(id)?.values())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldArray> {
        self.arrays.values()
    }
}
