//! Declared property types, used to pick text vs numeric comparison for JSON paths.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TranslateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Declared as `"null"` and nothing else.
    Null,
    Unknown,
}

impl JsonType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => JsonType::String,
            "number" => JsonType::Number,
            "integer" => JsonType::Integer,
            "boolean" => JsonType::Boolean,
            "array" => JsonType::Array,
            "object" => JsonType::Object,
            "null" => JsonType::Null,
            _ => JsonType::Unknown,
        }
    }

    pub fn is_numeric(&self) -> bool { matches!(self, JsonType::Number | JsonType::Integer) }

    /// Reads a JSON-Schema `type` keyword. A list of types drops `"null"` and takes the first remaining entry.
    fn from_type_keyword(keyword: &Value) -> Self {
        match keyword {
            Value::String(name) => JsonType::from_name(name),
            Value::Array(names) => {
                let mut saw_null = false;
                for name in names.iter().filter_map(Value::as_str) {
                    if name == "null" {
                        saw_null = true;
                    } else {
                        return JsonType::from_name(name);
                    }
                }
                if saw_null {
                    JsonType::Null
                } else {
                    JsonType::Unknown
                }
            }
            _ => JsonType::Unknown,
        }
    }
}

/// Lookup of the declared type of a top-level property.
pub trait SchemaLookup: fmt::Debug + Send + Sync {
    /// Returns [`JsonType::Unknown`] for undeclared properties.
    fn property_type(&self, property: &str) -> JsonType;
}

/// Property types read from a JSON-Schema document's `properties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonSchema {
    properties: HashMap<String, JsonType>,
}

impl JsonSchema {
    pub fn new() -> Self { Self::default() }

    pub fn with_property(mut self, name: impl Into<String>, json_type: JsonType) -> Self {
        self.properties.insert(name.into(), json_type);
        self
    }

    pub fn from_value(schema: &Value) -> Result<Self, TranslateError> {
        let Value::Object(schema) = schema else {
            return Err(TranslateError::Config("schema must be a JSON object".into()));
        };
        let properties = match schema.get("properties") {
            None => return Ok(Self::default()),
            Some(Value::Object(properties)) => properties,
            Some(_) => return Err(TranslateError::Config("schema properties must be a JSON object".into())),
        };

        let properties = properties
            .iter()
            .map(|(name, property)| {
                let json_type = property.get("type").map(JsonType::from_type_keyword).unwrap_or(JsonType::Unknown);
                (name.clone(), json_type)
            })
            .collect();
        Ok(Self { properties })
    }

    pub fn len(&self) -> usize { self.properties.len() }

    pub fn is_empty(&self) -> bool { self.properties.is_empty() }
}

impl SchemaLookup for JsonSchema {
    fn property_type(&self, property: &str) -> JsonType { self.properties.get(property).copied().unwrap_or(JsonType::Unknown) }
}

impl<S: Into<String>> FromIterator<(S, JsonType)> for JsonSchema {
    fn from_iter<I: IntoIterator<Item = (S, JsonType)>>(iter: I) -> Self {
        Self { properties: iter.into_iter().map(|(name, json_type)| (name.into(), json_type)).collect() }
    }
}
