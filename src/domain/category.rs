//! Syntax categories and the record schema
//!
//! Every record belongs to exactly one [`SyntaxCategory`]. The category decides
//! which [`Field`]s apply, in which order they are written to the wire, and the
//! `doc` value the remote service files the record under.
//!
//! Wire values are the plural lowercase category names:
//! - `events`, `conditions`, `effects`, `expressions`, `types`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CategoryError {
    #[error("Unknown syntax category: '{0}'")]
    Unknown(String),
}

/// The kind of syntax element a record documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxCategory {
    Event,
    Condition,
    Effect,
    Expression,
    Type,
}

/// Fields every category carries, in wire order
const COMMON_FIELDS: [Field; 9] = [
    Field::Category,
    Field::Name,
    Field::RemoteId,
    Field::Description,
    Field::Examples,
    Field::Pattern,
    Field::OwnerAddon,
    Field::Dependency,
    Field::Since,
];

const EVENT_FIELDS: [Field; 10] = [
    Field::Category,
    Field::Name,
    Field::RemoteId,
    Field::Description,
    Field::Examples,
    Field::Pattern,
    Field::OwnerAddon,
    Field::Dependency,
    Field::Since,
    Field::EventValues,
];

const EXPRESSION_FIELDS: [Field; 11] = [
    Field::Category,
    Field::Name,
    Field::RemoteId,
    Field::Description,
    Field::Examples,
    Field::Pattern,
    Field::OwnerAddon,
    Field::Dependency,
    Field::Since,
    Field::ReturnType,
    Field::Changers,
];

const TYPE_FIELDS: [Field; 10] = [
    Field::Category,
    Field::Name,
    Field::RemoteId,
    Field::Description,
    Field::Examples,
    Field::Pattern,
    Field::OwnerAddon,
    Field::Dependency,
    Field::Since,
    Field::Usage,
];

impl SyntaxCategory {
    /// All categories, in the priority order used for class-hierarchy tests
    pub const ALL: [SyntaxCategory; 5] = [
        SyntaxCategory::Event,
        SyntaxCategory::Condition,
        SyntaxCategory::Effect,
        SyntaxCategory::Expression,
        SyntaxCategory::Type,
    ];

    /// Returns the fields that apply to this category, in wire order
    ///
    /// The common fields come first, followed by the category extras.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            SyntaxCategory::Event => &EVENT_FIELDS,
            SyntaxCategory::Condition | SyntaxCategory::Effect => &COMMON_FIELDS,
            SyntaxCategory::Expression => &EXPRESSION_FIELDS,
            SyntaxCategory::Type => &TYPE_FIELDS,
        }
    }

    /// Returns true if `field` applies to this category
    pub fn has_field(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }

    /// The plural lowercase name used as the `doc` wire value
    pub fn wire_name(&self) -> &'static str {
        match self {
            SyntaxCategory::Event => "events",
            SyntaxCategory::Condition => "conditions",
            SyntaxCategory::Effect => "effects",
            SyntaxCategory::Expression => "expressions",
            SyntaxCategory::Type => "types",
        }
    }

    /// Parses a wire value, tolerating case and a missing trailing `s`
    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        let singular = value.strip_suffix('s').unwrap_or(value);
        Self::ALL.into_iter().find(|category| {
            let wire = category.wire_name();
            wire[..wire.len() - 1].eq_ignore_ascii_case(singular)
        })
    }
}

impl fmt::Display for SyntaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for SyntaxCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| CategoryError::Unknown(s.to_string()))
    }
}

/// The value shape a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// A single string (may span several lines)
    Text,
    /// An array of strings
    List,
    /// An integer (only the remote id)
    Id,
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldShape::Text => "text",
            FieldShape::List => "list",
            FieldShape::Id => "id",
        };
        f.write_str(name)
    }
}

/// A documented property of a syntax record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Display name. Required.
    Name,
    /// Free-form description
    Description,
    /// Usage examples
    Examples,
    /// The syntax pattern(s). Required.
    Pattern,
    /// Version the element was added in, `1.0` when unknown
    Since,
    /// The record's category
    Category,
    /// Plugin(s) the element depends on
    Dependency,
    /// Return type code name (expressions)
    ReturnType,
    /// Accepted change modes (expressions)
    Changers,
    /// Usage notes (types)
    Usage,
    /// Event values (events)
    EventValues,
    /// Name of the addon that owns the element
    OwnerAddon,
    /// Id assigned by the remote service
    RemoteId,
}

impl Field {
    /// The key this field is written under in a wire payload
    pub fn wire_key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "desc",
            Field::Examples => "examples",
            Field::Pattern => "pattern",
            Field::Since => "version",
            Field::Category => "doc",
            Field::Dependency => "plugin",
            Field::ReturnType => "returntype",
            Field::Changers => "changers",
            Field::Usage => "usage",
            Field::EventValues => "eventvalues",
            Field::OwnerAddon => "addon",
            Field::RemoteId => "id",
        }
    }

    /// The value shape this field accepts
    pub fn shape(&self) -> FieldShape {
        match self {
            Field::Changers | Field::EventValues => FieldShape::List,
            Field::RemoteId => FieldShape::Id,
            _ => FieldShape::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}
