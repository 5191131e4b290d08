//! Syntax source shapes
//!
//! The host hands us syntax elements in four shapes. [`SyntaxSource`] is the
//! closed set of them; the extractor matches on it once per element.
//!
//! | Shape       | Used for                          | Native accessors             |
//! |-------------|-----------------------------------|------------------------------|
//! | `class`     | any element, bare class metadata  | tags only                    |
//! | `element`   | conditions, effects, expressions  | patterns, return type        |
//! | `event`     | events                            | name, docs, patterns, since  |
//! | `class_info`| types                             | doc name, docs, usage, since |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::SyntaxCategory;

/// Sentinel marking an element that must never be documented
///
/// Events carry it as their whole description, types as their doc name.
pub const NO_DOC: &str = "NO_DOC";

/// The marker supertypes a syntax class can extend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Event,
    Condition,
    Effect,
    Expression,
    Type,
}

impl Marker {
    fn category(&self) -> SyntaxCategory {
        match self {
            Marker::Event => SyntaxCategory::Event,
            Marker::Condition => SyntaxCategory::Condition,
            Marker::Effect => SyntaxCategory::Effect,
            Marker::Expression => SyntaxCategory::Expression,
            Marker::Type => SyntaxCategory::Type,
        }
    }
}

/// Ways an expression's value can be changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    Add,
    Set,
    Remove,
    RemoveAll,
    Delete,
    Reset,
}

impl ChangeMode {
    pub const ALL: [ChangeMode; 6] = [
        ChangeMode::Add,
        ChangeMode::Set,
        ChangeMode::Remove,
        ChangeMode::RemoveAll,
        ChangeMode::Delete,
        ChangeMode::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeMode::Add => "add",
            ChangeMode::Set => "set",
            ChangeMode::Remove => "remove",
            ChangeMode::RemoveAll => "remove_all",
            ChangeMode::Delete => "delete",
            ChangeMode::Reset => "reset",
        }
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProbeError {
    #[error("Change modes of {0} cannot be queried")]
    Unavailable(String),
}

/// Answers whether an expression accepts a change mode
pub trait ChangeCapability {
    fn accepts_change(&self, mode: ChangeMode) -> Result<bool, ProbeError>;
}

/// Static metadata attached to a syntax class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassMetadata {
    /// Fully qualified class name, e.g. `com.example.addon.effects.EffGive`
    pub class_name: String,

    /// Marker supertypes the class extends
    pub markers: Vec<Marker>,

    /// Carries the "no documentation" marker
    pub no_doc: bool,

    pub name: Option<String>,
    pub description: Vec<String>,
    pub examples: Vec<String>,

    /// Pattern override tag
    pub patterns: Vec<String>,

    pub since: Option<String>,
    pub dependency: Option<String>,

    /// Explicit changer tag (expressions)
    pub changers: Option<Vec<ChangeMode>>,

    /// Explicit return type tag (expressions)
    pub return_type: Option<String>,

    /// Change modes the expression accepts, when it can be queried
    pub accepted_changes: Option<Vec<ChangeMode>>,
}

impl ClassMetadata {
    /// Creates metadata for a class with the given markers
    pub fn new(class_name: impl Into<String>, markers: Vec<Marker>) -> Self {
        Self {
            class_name: class_name.into(),
            markers,
            ..Self::default()
        }
    }

    /// The package part of the class name
    pub fn package(&self) -> &str {
        package_of(&self.class_name)
    }

    /// Category from the class hierarchy
    ///
    /// Markers are tested in the fixed order event, condition, effect,
    /// expression, type; the first one present wins.
    pub fn category(&self) -> Option<SyntaxCategory> {
        SyntaxCategory::ALL.into_iter().find(|category| {
            self.markers
                .iter()
                .any(|marker| marker.category() == *category)
        })
    }

    /// Returns true if the class extends the expression marker
    pub fn is_expression(&self) -> bool {
        self.markers.contains(&Marker::Expression)
    }
}

impl ChangeCapability for ClassMetadata {
    fn accepts_change(&self, mode: ChangeMode) -> Result<bool, ProbeError> {
        match &self.accepted_changes {
            Some(modes) => Ok(modes.contains(&mode)),
            None => Err(ProbeError::Unavailable(self.class_name.clone())),
        }
    }
}

/// Registration info of a condition, effect or expression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementInfo {
    pub class: ClassMetadata,

    /// Patterns the element was registered with
    pub patterns: Vec<String>,

    /// Declared return type (expressions), resolved through the type registry
    pub return_type: Option<String>,
}

/// Registration info of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInfo {
    pub class: ClassMetadata,
    pub name: String,
    pub description: Vec<String>,
    pub examples: Vec<String>,
    pub patterns: Vec<String>,
    pub since: Option<String>,
    pub event_values: Vec<String>,
}

impl EventInfo {
    /// Returns true if the description is the suppression sentinel
    pub fn is_suppressed(&self) -> bool {
        self.description.len() == 1 && self.description[0] == NO_DOC
    }
}

/// Registration info of a type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassInfoSource {
    pub class: ClassMetadata,
    pub code_name: String,
    pub doc_name: Option<String>,
    pub description: Vec<String>,
    pub examples: Vec<String>,

    /// Regexes the type is parsed from
    pub user_input_patterns: Vec<String>,

    pub usage: Vec<String>,
    pub since: Option<String>,

    /// Parser class, if the type registers one
    pub parser: Option<String>,
    /// Changer class, if the type registers one
    pub changer: Option<String>,
    /// Serializer class, if the type registers one
    pub serializer: Option<String>,
}

impl ClassInfoSource {
    /// Returns true if the doc name is the suppression sentinel
    pub fn is_suppressed(&self) -> bool {
        self.doc_name.as_deref() == Some(NO_DOC)
    }

    /// Package used to decide which addon owns this type
    ///
    /// The parser decides when present, then the changer, then the serializer,
    /// then the class itself.
    pub fn owner_package(&self) -> &str {
        [&self.parser, &self.changer, &self.serializer]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .map(|name| package_of(name))
            .unwrap_or_else(|| self.class.package())
    }
}

/// One syntax element as handed over by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxSource {
    Class(ClassMetadata),
    Element(ElementInfo),
    Event(EventInfo),
    ClassInfo(ClassInfoSource),
}

impl SyntaxSource {
    /// The class metadata behind this source
    pub fn class(&self) -> &ClassMetadata {
        match self {
            SyntaxSource::Class(class) => class,
            SyntaxSource::Element(info) => &info.class,
            SyntaxSource::Event(info) => &info.class,
            SyntaxSource::ClassInfo(info) => &info.class,
        }
    }

    /// The category this source documents
    pub fn category(&self) -> Option<SyntaxCategory> {
        match self {
            SyntaxSource::Event(_) => Some(SyntaxCategory::Event),
            SyntaxSource::ClassInfo(_) => Some(SyntaxCategory::Type),
            SyntaxSource::Class(class) => class.category(),
            SyntaxSource::Element(info) => info.class.category(),
        }
    }
}

fn package_of(class_name: &str) -> &str {
    class_name
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or("")
}
