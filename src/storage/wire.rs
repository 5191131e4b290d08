//! Wire format for syntax records
//!
//! Records travel as flat JSON objects keyed by [`Field::wire_key`]:
//!
//! ```json
//! {"id": 42, "doc": "effects", "name": "Give", "desc": null,
//!  "examples": null, "pattern": "give %item%", "addon": "MyAddon",
//!  "plugin": null, "version": "1.0"}
//! ```
//!
//! Decoding is lenient: unknown keys are ignored and values of the wrong
//! shape are dropped. A decoded record keeps the object it came from and
//! encodes back to it byte for byte until it is modified.

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{
    Field, FieldShape, FieldValue, Record, RecordSet, SyntaxCategory, DEFAULT_SINCE,
};

/// Converts records to and from wire payloads
#[derive(Debug, Clone)]
pub struct WireConverter {
    addon_name: String,
}

impl WireConverter {
    /// Creates a converter that fills `addon` with `addon_name` when empty
    pub fn new(addon_name: impl Into<String>) -> Self {
        Self {
            addon_name: addon_name.into(),
        }
    }

    /// Decodes one payload
    ///
    /// Returns `None` for anything that is not an object with a known `doc`.
    pub fn from_wire(&self, payload: &Value) -> Option<Record> {
        let object = payload.as_object()?;
        let category = object
            .get(Field::Category.wire_key())
            .and_then(primitive_string)
            .and_then(|doc| SyntaxCategory::from_wire(&doc))?;

        let mut record = Record::new(category);
        for &field in category.fields() {
            if field == Field::Category {
                continue;
            }
            let Some(value) = object.get(field.wire_key()).and_then(|v| decode_value(field, v))
            else {
                continue;
            };
            if let Err(err) = record.set(field, value) {
                debug!(field = %field, error = %err, "Ignoring mismatched wire value");
            }
        }

        record.attach_wire(object.clone());
        Some(record)
    }

    /// Decodes a batch, skipping undecodable payloads
    pub fn decode_all(&self, payloads: &[Value]) -> RecordSet {
        let mut records = RecordSet::new();
        for payload in payloads {
            match self.from_wire(payload) {
                Some(record) => records.push(record),
                None => debug!("Skipping undecodable syntax payload"),
            }
        }
        records
    }

    /// Encodes one record
    ///
    /// A record decoded from the wire and left untouched encodes to its
    /// original payload.
    pub fn to_wire(&self, record: &Record) -> Map<String, Value> {
        if let Some(cached) = record.wire() {
            return cached.clone();
        }

        let mut object = Map::new();
        for &field in record.category().fields() {
            let key = field.wire_key().to_string();
            match field {
                Field::RemoteId => {
                    if let Some(id) = record.remote_id() {
                        object.insert(key, Value::from(id));
                    }
                }
                Field::Category => {
                    object.insert(key, Value::from(record.category().wire_name()));
                }
                _ => {
                    let value = match record.get(field) {
                        Some(value) if !value.is_empty() => encode_value(value),
                        _ => self.empty_value(field),
                    };
                    object.insert(key, value);
                }
            }
        }
        object
    }

    /// Encodes a batch as a JSON array
    pub fn encode_all<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Value {
        Value::Array(
            records
                .into_iter()
                .map(|record| Value::Object(self.to_wire(record)))
                .collect(),
        )
    }

    fn empty_value(&self, field: Field) -> Value {
        match field {
            Field::Since => Value::from(DEFAULT_SINCE),
            Field::OwnerAddon => Value::from(self.addon_name.as_str()),
            _ => Value::Null,
        }
    }
}

fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) => Value::from(text.as_str()),
        FieldValue::List(items) => Value::from(items.clone()),
        FieldValue::Id(id) => Value::from(*id),
    }
}

fn decode_value(field: Field, value: &Value) -> Option<FieldValue> {
    match value {
        Value::Array(items) => Some(FieldValue::List(
            items.iter().filter_map(primitive_string).collect(),
        )),
        _ if field.shape() == FieldShape::Id => match value {
            Value::Number(n) => n.as_i64().map(FieldValue::Id),
            Value::String(s) => s.trim().parse().ok().map(FieldValue::Id),
            _ => None,
        },
        _ => primitive_string(value).map(FieldValue::Text),
    }
}

/// String form of a JSON primitive; `None` for null, arrays and objects
fn primitive_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
