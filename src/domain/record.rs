//! Generic record model shared by every entity kind.
//!
//! A [`Record`] is a flat (occasionally nested) JSON object that always carries
//! an `id` field. Books, users and credit packages are all records; what makes
//! them different lives in their [`EntitySchema`](crate::domain::EntitySchema),
//! not in their Rust type.

use crate::domain::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Name of the identifier field present on every record.
pub const ID_FIELD: &str = "id";

/// Field name to value mapping, the JSON-shaped payload of a record.
pub type Fields = Map<String, Value>;

/// Identifier of a record as assigned by the remote service.
///
/// Ids are compared by their textual form so that the numeric id `5` and the
/// string id `"5"` refer to the same record regardless of how a payload
/// encoded them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Extracts an id from a JSON value. Only strings and numbers qualify.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Converts the id back into JSON, preferring a number when it is one.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.0
            .parse::<u64>()
            .map_or_else(|_| Value::String(self.0.clone()), Value::from)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One domain entity instance represented as a field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Fields,
}

impl Record {
    #[must_use]
    pub const fn new(fields: Fields) -> Self {
        Self { fields }
    }

    /// Builds a record from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Storage`] when the value is not a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FolioError::Storage(format!(
                "record must be a JSON object, got {other}"
            ))),
        }
    }

    /// Returns the record identifier, if the `id` field holds one.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// Returns `true` if this record carries the given id.
    #[must_use]
    pub fn has_id(&self, id: &RecordId) -> bool {
        self.id().is_some_and(|own| &own == id)
    }

    /// Returns a top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolves a dotted field path such as `role.name`.
    ///
    /// Returns `None` when any segment is missing or traverses a non-object.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Textual form of a field path; absent or non-scalar values are empty.
    #[must_use]
    pub fn text(&self, path: &str) -> Cow<'_, str> {
        self.resolve(path).map_or(Cow::Borrowed(""), value_text)
    }

    /// Numeric form of a field path; absent or non-numeric values are zero.
    #[must_use]
    pub fn number(&self, path: &str) -> f64 {
        self.resolve(path).and_then(value_number).unwrap_or(0.0)
    }

    /// Replaces a single top-level field.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Copies every field of `patch` onto this record, leaving other fields
    /// untouched. The identifier is never overwritten.
    pub fn overlay(&mut self, patch: &Fields) {
        for (key, value) in patch {
            if key != ID_FIELD {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self { fields }
    }
}

/// Textual form of a scalar JSON value; `null`, arrays and objects are empty.
#[must_use]
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Null | Value::Array(_) | Value::Object(_) => Cow::Borrowed(""),
    }
}

/// Numeric form of a JSON value. Numeric strings such as `"9.99"` count.
#[must_use]
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn numeric_and_string_ids_are_equal() {
        assert_eq!(RecordId::from_value(&json!(5)), Some(RecordId::from("5")));
        assert_eq!(RecordId::from_value(&json!("5")), Some(RecordId::from(5_u64)));
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!("")), None);
    }

    #[test]
    fn id_round_trips_to_number_when_numeric() {
        assert_eq!(RecordId::from(7_u64).to_value(), json!(7));
        assert_eq!(RecordId::from("abc").to_value(), json!("abc"));
    }

    #[test]
    fn resolve_follows_nested_objects() {
        let user = record(json!({"id": 1, "role": {"name": "admin"}}));
        assert_eq!(user.resolve("role.name"), Some(&json!("admin")));
        assert_eq!(user.resolve("role.level"), None);
        assert_eq!(user.resolve("id.name"), None);
        assert_eq!(user.text("role.missing"), "");
    }

    #[test]
    fn number_reads_numeric_strings_and_defaults_to_zero() {
        let package = record(json!({"id": 1, "price": "9.50", "credits": 100, "name": "x"}));
        assert!((package.number("price") - 9.5).abs() < f64::EPSILON);
        assert!((package.number("credits") - 100.0).abs() < f64::EPSILON);
        assert!(package.number("name").abs() < f64::EPSILON);
        assert!(package.number("absent").abs() < f64::EPSILON);
    }

    #[test]
    fn overlay_keeps_identifier_and_untouched_fields() {
        let mut book = record(json!({"id": 1, "title": "Zeta", "author": "Ann"}));
        let patch = record(json!({"id": 99, "title": "Alpha"})).into_fields();
        book.overlay(&patch);
        assert_eq!(book.id(), Some(RecordId::from(1_u64)));
        assert_eq!(book.text("title"), "Alpha");
        assert_eq!(book.text("author"), "Ann");
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(Record::from_json(json!([1, 2])).is_err());
    }
}
