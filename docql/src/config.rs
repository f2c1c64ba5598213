//! Serializable translator configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ast::ComparisonOperator;
use crate::error::TranslateError;
use crate::path::PathStyle;

/// Which cast a numeric comparison applies to JSON text when no schema is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericCast {
    /// `::integer` for integer literals, `::float` for floating point literals.
    #[default]
    ByLiteral,
    /// Always `::numeric`.
    Numeric,
}

/// What to do with an operator clause naming more than one operator, e.g. `{"$gt": 1, "$lt": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleOperators {
    #[default]
    Conjoin,
    Reject,
}

/// Shadow columns, either as a list of field names (column named after the field) or a field → column map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappedProperties {
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl Default for MappedProperties {
    fn default() -> Self { MappedProperties::List(Vec::new()) }
}

impl MappedProperties {
    pub fn into_columns(self) -> IndexMap<String, String> {
        match self {
            MappedProperties::List(fields) => fields.into_iter().map(|field| (field.clone(), field)).collect(),
            MappedProperties::Map(map) => map,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    pub table: String,
    #[serde(default = "default_payload_column")]
    pub payload_column: String,
    #[serde(default = "default_identity_column")]
    pub identity_column: String,
    #[serde(default = "default_identity_alias")]
    pub identity_alias: String,
    #[serde(default)]
    pub mapped_properties: MappedProperties,
    /// Custom operators with a fixed comparison kind, e.g. `{"$as": "eq"}`.
    #[serde(default)]
    pub custom_operators: IndexMap<String, ComparisonOperator>,
    /// A JSON-Schema document describing the payload.
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub path_style: PathStyle,
    #[serde(default)]
    pub numeric_cast: NumericCast,
    #[serde(default)]
    pub multiple_operators: MultipleOperators,
}

fn default_payload_column() -> String { "data".into() }

fn default_identity_column() -> String { "id".into() }

fn default_identity_alias() -> String { "_id".into() }

impl TranslatorConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            payload_column: default_payload_column(),
            identity_column: default_identity_column(),
            identity_alias: default_identity_alias(),
            mapped_properties: MappedProperties::default(),
            custom_operators: IndexMap::new(),
            schema: None,
            path_style: PathStyle::default(),
            numeric_cast: NumericCast::default(),
            multiple_operators: MultipleOperators::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TranslateError> {
        let config: TranslatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TranslateError> {
        for (name, value) in [
            ("table", &self.table),
            ("payload_column", &self.payload_column),
            ("identity_column", &self.identity_column),
            ("identity_alias", &self.identity_alias),
        ] {
            if value.is_empty() {
                return Err(TranslateError::Config(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}
