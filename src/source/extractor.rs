//! Field extraction
//!
//! Turns a [`SyntaxSource`] into a [`Record`]. Each source shape has its own
//! accessor set and falls back to the class metadata for whatever it cannot
//! supply itself:
//!
//! - `class`: tags only
//! - `element`: class tags, then the registered patterns and the declared
//!   return type resolved through the type registry
//! - `event`: native accessors, then class tags
//! - `class_info`: native accessors, then class tags
//!
//! Addons with their own documentation scheme implement [`FieldExtractor`]
//! and hand it to the orchestrator instead of [`DefaultExtractor`].

use tracing::{debug, warn};

use super::host::{AddonIdentity, TypeRegistry};
use super::metadata::{
    ChangeCapability, ChangeMode, ClassInfoSource, ClassMetadata, ElementInfo, EventInfo,
    SyntaxSource,
};
use crate::domain::{pattern, Field, FieldShape, FieldValue, Record, SyntaxCategory};

/// Reads documentation fields out of syntax sources
pub trait FieldExtractor: Send + Sync {
    /// Returns false if the source must not be documented
    fn check(&self, source: &SyntaxSource) -> bool;

    /// Values for one field; `None` when the source has nothing for it
    fn extract(
        &self,
        field: Field,
        source: &SyntaxSource,
        types: &dyn TypeRegistry,
    ) -> Option<Vec<String>>;
}

/// Builds a record from a source, or `None` if the source is excluded
///
/// List fields receive the extracted values as-is; text fields receive them
/// joined with newlines.
pub fn extract_record(
    extractor: &dyn FieldExtractor,
    source: &SyntaxSource,
    types: &dyn TypeRegistry,
) -> Option<Record> {
    let class_name = &source.class().class_name;

    let Some(category) = source.category() else {
        debug!(class = %class_name, "Skipping source without a syntax category");
        return None;
    };

    if !extractor.check(source) {
        debug!(class = %class_name, "Skipping undocumented source");
        return None;
    }

    let mut record = Record::new(category);
    for &field in category.fields() {
        if matches!(field, Field::Category | Field::RemoteId) {
            continue;
        }

        let values = match extractor.extract(field, source, types) {
            Some(values) if !is_blank(&values) => values,
            _ => continue,
        };

        let value = match field.shape() {
            FieldShape::List => FieldValue::List(values),
            _ => FieldValue::Text(values.join("\n")),
        };

        if let Err(err) = record.set(field, value) {
            warn!(class = %class_name, error = %err, "Dropping extracted field");
        }
    }

    Some(record)
}

/// The built-in extractor
pub struct DefaultExtractor {
    addon: AddonIdentity,
    friendly: bool,
}

impl DefaultExtractor {
    /// Creates an extractor for `addon`
    ///
    /// With `friendly` set, registered patterns are rewritten into their
    /// readable form before publishing.
    pub fn new(addon: AddonIdentity, friendly: bool) -> Self {
        Self { addon, friendly }
    }

    /// Returns the addon this extractor attributes elements to
    pub fn addon(&self) -> &AddonIdentity {
        &self.addon
    }

    fn owner(&self, package: &str) -> Option<Vec<String>> {
        self.addon
            .owns_package(package)
            .then(|| vec![self.addon.name.clone()])
    }

    fn friendly_patterns(&self, patterns: &[String]) -> Option<Vec<String>> {
        if self.friendly {
            list(patterns.iter().map(|p| pattern::friendly(p)).collect())
        } else {
            list(patterns.to_vec())
        }
    }

    /// Static class metadata
    pub fn from_class(&self, field: Field, class: &ClassMetadata) -> Option<Vec<String>> {
        let category = class.category();
        let plain_element = !matches!(
            category,
            Some(SyntaxCategory::Event) | Some(SyntaxCategory::Type)
        );

        match field {
            Field::OwnerAddon => self.owner(class.package()),
            Field::Pattern => list(class.patterns.clone()),
            Field::Name => single(class.name.as_deref()),
            Field::Description => list(class.description.clone()),
            Field::Examples => list(class.examples.clone()),
            Field::Since => single(class.since.as_deref()),
            Field::Category => category.map(|c| vec![c.wire_name().to_string()]),
            Field::ReturnType if class.is_expression() => single(class.return_type.as_deref()),
            Field::Changers if class.is_expression() && plain_element => changers(class),
            Field::Dependency if plain_element => dependency_tag(class),
            _ => None,
        }
    }

    /// Condition, effect and expression registration info
    pub fn from_element(
        &self,
        field: Field,
        info: &ElementInfo,
        types: &dyn TypeRegistry,
    ) -> Option<Vec<String>> {
        if let Some(values) = self.from_class(field, &info.class).filter(|v| !is_blank(v)) {
            return Some(values);
        }

        match field {
            Field::Pattern => self.friendly_patterns(&info.patterns),
            Field::ReturnType if info.class.is_expression() => info
                .return_type
                .as_deref()
                .and_then(|declared| types.exact_code_name(declared))
                .map(|code_name| vec![code_name]),
            _ => None,
        }
    }

    /// Event registration info
    pub fn from_event(&self, field: Field, info: &EventInfo) -> Option<Vec<String>> {
        let native = match field {
            Field::Name => single(Some(info.name.as_str())),
            Field::Description => list(info.description.clone()),
            Field::Examples => list(info.examples.clone()),
            Field::Pattern => self.friendly_patterns(&info.patterns),
            Field::Since => single(info.since.as_deref()),
            Field::Category => Some(vec![SyntaxCategory::Event.wire_name().to_string()]),
            Field::EventValues => list(info.event_values.clone()),
            Field::Changers | Field::ReturnType | Field::Usage | Field::RemoteId => return None,
            Field::Dependency | Field::OwnerAddon => None,
        };

        native.or_else(|| self.class_fallback(field, &info.class))
    }

    /// Type registration info
    pub fn from_class_info(&self, field: Field, info: &ClassInfoSource) -> Option<Vec<String>> {
        let native = match field {
            Field::Name => single(info.doc_name.as_deref()),
            Field::Description => list(info.description.clone()),
            Field::Examples => list(info.examples.clone()),
            Field::Pattern => {
                let patterns = if self.friendly {
                    info.user_input_patterns
                        .iter()
                        .map(|p| pattern::friendly_type_pattern(p))
                        .collect()
                } else {
                    info.user_input_patterns.clone()
                };
                list(patterns)
            }
            Field::Usage => list(info.usage.clone()),
            Field::Since => single(info.since.as_deref()),
            Field::Category => Some(vec![SyntaxCategory::Type.wire_name().to_string()]),
            Field::OwnerAddon => return self.owner(info.owner_package()),
            Field::Changers | Field::ReturnType | Field::EventValues | Field::RemoteId => {
                return None
            }
            Field::Dependency => None,
        };

        native.or_else(|| self.class_fallback(field, &info.class))
    }

    /// Class lookup used by the wrappers; the dependency tag is always read
    fn class_fallback(&self, field: Field, class: &ClassMetadata) -> Option<Vec<String>> {
        match field {
            Field::Dependency => dependency_tag(class),
            _ => self.from_class(field, class),
        }
    }
}

impl FieldExtractor for DefaultExtractor {
    fn check(&self, source: &SyntaxSource) -> bool {
        let suppressed = match source {
            SyntaxSource::Event(info) => info.is_suppressed(),
            SyntaxSource::ClassInfo(info) => info.is_suppressed(),
            SyntaxSource::Class(_) | SyntaxSource::Element(_) => false,
        };
        !suppressed && !source.class().no_doc
    }

    fn extract(
        &self,
        field: Field,
        source: &SyntaxSource,
        types: &dyn TypeRegistry,
    ) -> Option<Vec<String>> {
        match source {
            SyntaxSource::Class(class) => self.from_class(field, class),
            SyntaxSource::Element(info) => self.from_element(field, info, types),
            SyntaxSource::Event(info) => self.from_event(field, info),
            SyntaxSource::ClassInfo(info) => self.from_class_info(field, info),
        }
    }
}

fn dependency_tag(class: &ClassMetadata) -> Option<Vec<String>> {
    single(class.dependency.as_deref())
}

/// Explicit changer tag, or whatever the capability query reports
fn changers(class: &ClassMetadata) -> Option<Vec<String>> {
    if let Some(tagged) = &class.changers {
        return list(tagged.iter().map(|mode| mode.as_str().to_string()).collect());
    }

    let mut accepted = Vec::new();
    for mode in ChangeMode::ALL {
        match class.accepts_change(mode) {
            Ok(true) => accepted.push(mode.as_str().to_string()),
            Ok(false) => {}
            Err(err) => {
                debug!(class = %class.class_name, error = %err, "No changers detected");
                return None;
            }
        }
    }
    list(accepted)
}

fn single(value: Option<&str>) -> Option<Vec<String>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| vec![v.to_string()])
}

fn list(values: Vec<String>) -> Option<Vec<String>> {
    if is_blank(&values) {
        None
    } else {
        Some(values)
    }
}

fn is_blank(values: &[String]) -> bool {
    values.iter().all(|v| v.is_empty())
}
