//! Filter documents: MongoDB-style JSON objects describing a query predicate.

use serde_json::{Map, Value};

use crate::error::TranslateError;

/// Prefix marking operator and combinator keys.
pub const OPERATOR_SIGIL: char = '$';

/// An ordered mapping from field path (or combinator) to filter value.
pub type FilterDocument = Map<String, Value>;

pub fn is_operator(key: &str) -> bool { key.starts_with(OPERATOR_SIGIL) }

/// A mapping is an operator clause iff at least one of its keys carries the operator sigil.
/// Anything else is an opaque value compared by its JSON text.
pub fn is_operator_clause(mapping: &Map<String, Value>) -> bool { mapping.keys().any(|key| is_operator(key)) }

/// Text form of a value as it appears inside extracted JSON text: strings are bare, everything
/// else is its JSON encoding (`true`, `2.1`, `{"a":1}`).
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn as_document(value: &Value) -> Result<&FilterDocument, TranslateError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TranslateError::InvalidDocument(kind(other))),
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
