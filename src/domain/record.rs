//! Syntax record domain model
//!
//! A [`Record`] is the normalized description of one syntax element: a field
//! bag scoped to a single [`SyntaxCategory`]. Records come from two places:
//! the field extractor (local, no remote id) and the wire converter (remote,
//! carries the id and the payload it was decoded from).
//!
//! Equality is the change-detection contract, not identity: it ignores
//! `Examples` and the remote id, and compares patterns in normalized form.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::category::{Field, FieldShape, SyntaxCategory};
use super::pattern;

/// Value published for `Since` when a record does not carry one
pub const DEFAULT_SINCE: &str = "1.0";

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Field '{field}' expects a {expected} value, got {found}")]
    TypeMismatch {
        field: Field,
        expected: FieldShape,
        found: FieldShape,
    },

    #[error("Field '{field}' does not apply to {category}")]
    NotApplicable {
        field: Field,
        category: SyntaxCategory,
    },

    #[error("The category of a record cannot be changed")]
    CategoryImmutable,
}

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Id(i64),
}

impl FieldValue {
    /// The shape of this value
    pub fn shape(&self) -> FieldShape {
        match self {
            FieldValue::Text(_) => FieldShape::Text,
            FieldValue::List(_) => FieldShape::List,
            FieldValue::Id(_) => FieldShape::Id,
        }
    }

    /// Returns true for empty text, an empty list, or a list of empty strings
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.is_empty()),
            FieldValue::Id(_) => false,
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

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Id(value)
    }
}

/// A normalized syntax record
#[derive(Debug, Clone)]
pub struct Record {
    category: SyntaxCategory,
    values: BTreeMap<Field, FieldValue>,
    /// Payload this record was decoded from; dropped on any write
    wire: Option<Map<String, Value>>,
}

impl Record {
    /// Creates an empty record of the given category
    pub fn new(category: SyntaxCategory) -> Self {
        let mut values = BTreeMap::new();
        values.insert(
            Field::Category,
            FieldValue::Text(category.wire_name().to_string()),
        );
        Self {
            category,
            values,
            wire: None,
        }
    }

    /// Returns the record's category
    pub fn category(&self) -> SyntaxCategory {
        self.category
    }

    /// Gets a field value
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Gets a text field
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Gets a list field
    pub fn list(&self, field: Field) -> Option<&[String]> {
        match self.values.get(&field) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Gets the remote id, if this record is published
    pub fn remote_id(&self) -> Option<i64> {
        match self.values.get(&Field::RemoteId) {
            Some(FieldValue::Id(id)) => Some(*id),
            _ => None,
        }
    }

    /// Returns the record's name, empty when absent
    pub fn name(&self) -> &str {
        self.text(Field::Name).unwrap_or("")
    }

    /// Sets a field value
    ///
    /// Fails when the value's shape does not match the field's, when the field
    /// does not apply to this record's category, or when the field is the
    /// category itself.
    pub fn set(
        &mut self,
        field: Field,
        value: impl Into<FieldValue>,
    ) -> Result<&mut Self, RecordError> {
        let value = value.into();

        if field == Field::Category {
            return Err(RecordError::CategoryImmutable);
        }
        if !self.category.has_field(field) {
            return Err(RecordError::NotApplicable {
                field,
                category: self.category,
            });
        }
        if value.shape() != field.shape() {
            return Err(RecordError::TypeMismatch {
                field,
                expected: field.shape(),
                found: value.shape(),
            });
        }

        self.values.insert(field, value);
        self.wire = None;
        Ok(self)
    }

    /// Removes a field value
    pub fn clear(&mut self, field: Field) -> Option<FieldValue> {
        if field == Field::Category {
            return None;
        }
        let removed = self.values.remove(&field);
        if removed.is_some() {
            self.wire = None;
        }
        removed
    }

    /// Returns true if both name and pattern are present and non-empty
    pub fn is_valid(&self) -> bool {
        let filled = |field| self.text(field).is_some_and(|text| !text.is_empty());
        filled(Field::Name) && filled(Field::Pattern)
    }

    /// Returns true if the record has a value for `field` that is not empty
    pub fn has(&self, field: Field) -> bool {
        self.values.get(&field).is_some_and(|value| !value.is_empty())
    }

    /// Iterates over the set fields in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    /// The payload this record was decoded from, if untouched since
    pub fn wire(&self) -> Option<&Map<String, Value>> {
        self.wire.as_ref()
    }

    pub(crate) fn attach_wire(&mut self, payload: Map<String, Value>) {
        self.wire = Some(payload);
    }

    /// Text comparison where an absent value equals an empty one
    fn same_text(&self, other: &Self, field: Field) -> bool {
        self.text(field).unwrap_or("") == other.text(field).unwrap_or("")
    }

    fn same_list(&self, other: &Self, field: Field) -> bool {
        self.list(field).unwrap_or(&[]) == other.list(field).unwrap_or(&[])
    }

    fn since_or_default(&self) -> &str {
        match self.text(Field::Since) {
            Some(since) if !since.is_empty() => since,
            _ => DEFAULT_SINCE,
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
            && self.same_text(other, Field::Name)
            && self.same_text(other, Field::Description)
            && pattern::equals_patterns(self.text(Field::Pattern), other.text(Field::Pattern))
            && self.same_text(other, Field::Dependency)
            && self.since_or_default() == other.since_or_default()
            && self.same_text(other, Field::ReturnType)
            && self.same_text(other, Field::OwnerAddon)
            && self.same_text(other, Field::Usage)
            && self.same_list(other, Field::Changers)
            && self.same_list(other, Field::EventValues)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.category, self.name())?;
        if let Some(id) = self.remote_id() {
            write!(f, " (#{})", id)?;
        }
        Ok(())
    }
}

/// An insertion-ordered collection of records
#[derive(Debug, Clone, Default)]
pub struct RecordSet(Vec<Record>);

impl RecordSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a record
    pub fn push(&mut self, record: Record) {
        self.0.push(record);
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.0.iter()
    }

    /// Iterates mutably over the records in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.0.iter_mut()
    }

    /// Keeps only the records for which `keep` returns true, preserving order
    pub fn retain_mut(&mut self, keep: impl FnMut(&mut Record) -> bool) {
        self.0.retain_mut(keep);
    }

    /// Returns the records that carry no remote id
    pub fn additions(&self) -> impl Iterator<Item = &Record> {
        self.0.iter().filter(|r| r.remote_id().is_none())
    }

    /// Returns the records that carry a remote id
    pub fn edits(&self) -> impl Iterator<Item = &Record> {
        self.0.iter().filter(|r| r.remote_id().is_some())
    }

    /// Consumes the set, returning the records
    pub fn into_vec(self) -> Vec<Record> {
        self.0
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl Extend<Record> for RecordSet {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(name: &str, pattern: &str) -> Record {
        let mut record = Record::new(SyntaxCategory::Effect);
        record
            .set(Field::Name, name)
            .unwrap()
            .set(Field::Pattern, pattern)
            .unwrap();
        record
    }

    #[test]
    fn valid_needs_name_and_pattern() {
        let mut record = Record::new(SyntaxCategory::Effect);
        assert!(!record.is_valid());

        record.set(Field::Name, "give item").unwrap();
        assert!(!record.is_valid());

        record.set(Field::Pattern, "").unwrap();
        assert!(!record.is_valid());

        record.set(Field::Pattern, "give %item%").unwrap();
        assert!(record.is_valid());
    }

    #[test]
    fn category_is_readable_but_fixed() {
        let mut record = Record::new(SyntaxCategory::Type);
        assert_eq!(record.text(Field::Category), Some("types"));
        assert_eq!(
            record.set(Field::Category, "effects").unwrap_err(),
            RecordError::CategoryImmutable
        );
        assert!(record.clear(Field::Category).is_none());
        assert_eq!(record.category(), SyntaxCategory::Type);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let mut record = Record::new(SyntaxCategory::Expression);

        let err = record
            .set(Field::Changers, "set")
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::TypeMismatch {
                field: Field::Changers,
                expected: FieldShape::List,
                found: FieldShape::Text,
            }
        );

        let err = record.set(Field::RemoteId, "42").unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { field: Field::RemoteId, .. }));

        assert!(record.get(Field::Changers).is_none());
    }

    #[test]
    fn inapplicable_field_is_an_error() {
        let mut record = Record::new(SyntaxCategory::Effect);
        let err = record.set(Field::Usage, "no").unwrap_err();
        assert_eq!(
            err,
            RecordError::NotApplicable {
                field: Field::Usage,
                category: SyntaxCategory::Effect,
            }
        );
    }

    #[test]
    fn writes_drop_the_cached_payload() {
        let mut record = effect("give item", "give %item%");
        record.attach_wire(Map::new());
        assert!(record.wire().is_some());

        record.set(Field::Description, "gives an item").unwrap();
        assert!(record.wire().is_none());

        record.attach_wire(Map::new());
        record.clear(Field::Description);
        assert!(record.wire().is_none());
    }

    #[test]
    fn failed_write_keeps_the_cached_payload() {
        let mut record = effect("give item", "give %item%");
        record.attach_wire(Map::new());
        let _ = record.set(Field::RemoteId, "not a number");
        assert!(record.wire().is_some());
    }

    #[test]
    fn equality_ignores_examples_and_id() {
        let mut local = effect("give item", "give %item%");
        local.set(Field::Examples, "give dirt to player").unwrap();

        let mut remote = effect("give item", "give %item%");
        remote.set(Field::Examples, "give stone").unwrap();
        remote.set(Field::RemoteId, 42_i64).unwrap();

        assert_eq!(local, remote);
    }

    #[test]
    fn equality_sees_description_changes() {
        let mut a = effect("give item", "give %item%");
        let mut b = effect("give item", "give %item%");
        a.set(Field::Description, "gives an item").unwrap();
        b.set(Field::Description, "gives items").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn equality_normalizes_patterns() {
        let a = effect("x", "(1|2|3|{{g|l|v}})");
        let b = effect("x", "(1|2|3|v)");
        assert_eq!(a, b);
    }

    #[test]
    fn equality_defaults_since_and_empty_text() {
        let a = effect("x", "y");
        let mut b = effect("x", "y");
        b.set(Field::Since, DEFAULT_SINCE).unwrap();
        b.set(Field::Description, "").unwrap();
        assert_eq!(a, b);

        b.set(Field::Since, "2.0").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn equality_requires_same_category() {
        let a = effect("x", "y");
        let mut b = Record::new(SyntaxCategory::Condition);
        b.set(Field::Name, "x").unwrap().set(Field::Pattern, "y").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn equality_compares_lists() {
        let mut a = Record::new(SyntaxCategory::Expression);
        let mut b = Record::new(SyntaxCategory::Expression);
        a.set(Field::Changers, vec!["set".to_string()]).unwrap();
        assert_ne!(a, b);

        b.set(Field::Changers, vec!["set".to_string()]).unwrap();
        assert_eq!(a, b);

        a.clear(Field::Changers);
        b.set(Field::Changers, Vec::<String>::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn record_set_keeps_order() {
        let mut set = RecordSet::new();
        set.push(effect("a", "a"));
        set.push(effect("b", "b"));
        set.push(effect("c", "c"));

        set.retain_mut(|r| r.name() != "b");
        let names: Vec<_> = set.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn record_set_splits_additions_and_edits() {
        let mut edited = effect("a", "a");
        edited.set(Field::RemoteId, 7_i64).unwrap();
        let set = RecordSet::from(vec![edited, effect("b", "b")]);

        assert_eq!(set.additions().count(), 1);
        assert_eq!(set.edits().count(), 1);
    }

    #[test]
    fn display_includes_id() {
        let mut record = effect("give item", "give %item%");
        assert_eq!(record.to_string(), "effects 'give item'");
        record.set(Field::RemoteId, 42_i64).unwrap();
        assert_eq!(record.to_string(), "effects 'give item' (#42)");
    }
}
