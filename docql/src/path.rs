//! Resolution of dotted field names to the identity column, a shadow column, or a JSON path.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::{CastType, Expr};
use crate::error::TranslateError;
use crate::quote::{quote_literal, Quoter};
use crate::schema::{JsonType, SchemaLookup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTarget {
    /// The row key column.
    Identity,
    /// A promoted scalar column holding a copy of a payload field.
    Shadow(String),
    /// A path into the payload column. `numeric` is set when the schema declares the top-level property numeric.
    JsonPath { segments: Vec<String>, numeric: bool },
}

/// How a JSON path accessor is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// Always `data#>>'{a,b}'`.
    #[default]
    Traversal,
    /// `data->>'a'` for single segments, `data#>>'{a,b}'` otherwise.
    Shallow,
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    identity_alias: String,
    payload_column: String,
    mapped: IndexMap<String, String>,
    schema: Option<Arc<dyn SchemaLookup>>,
    style: PathStyle,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            identity_alias: "_id".into(),
            payload_column: "data".into(),
            mapped: IndexMap::new(),
            schema: None,
            style: PathStyle::default(),
        }
    }
}

impl PathResolver {
    pub fn new() -> Self { Self::default() }

    pub fn resolve(&self, field: &str) -> PathTarget {
        if field == self.identity_alias {
            return PathTarget::Identity;
        }
        if let Some(column) = self.mapped.get(field) {
            return PathTarget::Shadow(column.clone());
        }

        let segments: Vec<String> = field.split('.').map(str::to_owned).collect();
        let numeric = self.declared_type(&segments[0]).is_some_and(|json_type| json_type.is_numeric());
        PathTarget::JsonPath { segments, numeric }
    }

    /// The declared type of a top-level property, or `None` when no schema is configured.
    pub fn declared_type(&self, property: &str) -> Option<JsonType> { self.schema.as_ref().map(|schema| schema.property_type(property)) }

    /// The text-extraction accessor for a path: `data#>>'{a,b}'`, or `data->>'a'` in shallow style.
    pub fn accessor(&self, segments: &[String], quoter: &dyn Quoter) -> Result<Expr, TranslateError> {
        let column = bare_identifier(&self.payload_column, quoter);
        let sql = match (self.style, segments) {
            (PathStyle::Shallow, [segment]) => format!("{}->>{}", column, quote_literal(quoter, segment)?.as_str()),
            _ => {
                let elements: Vec<String> = segments.iter().map(|segment| array_element(segment)).collect();
                let path = format!("{{{}}}", elements.join(","));
                format!("{}#>>{}", column, quote_literal(quoter, &path)?.as_str())
            }
        };
        Ok(Expr::Sql(sql))
    }

    /// The expression a target sorts and indexes by: native columns as-is, JSON paths by their
    /// accessor, cast to numeric when the schema says so.
    pub fn ordering_expr(&self, table: &str, identity_column: &str, target: &PathTarget, quoter: &dyn Quoter) -> Result<Expr, TranslateError> {
        Ok(match target {
            PathTarget::Identity => Expr::column(table, identity_column),
            PathTarget::Shadow(column) => Expr::column(table, column.as_str()),
            PathTarget::JsonPath { segments, numeric: true } => self.accessor(segments, quoter)?.grouped().cast(CastType::Numeric),
            PathTarget::JsonPath { segments, numeric: false } => self.accessor(segments, quoter)?,
        })
    }

    pub fn identity_alias(&self) -> &str { &self.identity_alias }

    pub fn payload_column(&self) -> &str { &self.payload_column }

    /// Mapped fields in configuration order, as `(field, column)`.
    pub fn mapped(&self) -> impl Iterator<Item = (&str, &str)> { self.mapped.iter().map(|(field, column)| (field.as_str(), column.as_str())) }

    pub(crate) fn set_identity_alias(&mut self, alias: String) { self.identity_alias = alias; }

    pub(crate) fn set_payload_column(&mut self, column: String) { self.payload_column = column; }

    pub(crate) fn map_property(&mut self, field: String, column: String) { self.mapped.insert(field, column); }

    pub(crate) fn set_schema(&mut self, schema: Arc<dyn SchemaLookup>) { self.schema = Some(schema); }

    pub(crate) fn set_style(&mut self, style: PathStyle) { self.style = style; }
}

/// Plain lowercase identifiers are written bare (`data`), anything else is quoted.
pub(crate) fn bare_identifier(name: &str, quoter: &dyn Quoter) -> String {
    let mut chars = name.chars();
    let plain = chars.next().is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        name.to_owned()
    } else {
        quoter.quote_identifier(name)
    }
}

/// One element of a Postgres text-array literal. Elements that the array parser would split or
/// reinterpret are double-quoted with backslash escapes.
fn array_element(segment: &str) -> String {
    let needs_quotes = segment.is_empty()
        || segment.eq_ignore_ascii_case("null")
        || segment.chars().any(|c| matches!(c, ',' | '{' | '}' | '"' | '\\') || c.is_whitespace());
    if !needs_quotes {
        return segment.to_owned();
    }

    let mut element = String::with_capacity(segment.len() + 2);
    element.push('"');
    for c in segment.chars() {
        if c == '"' || c == '\\' {
            element.push('\\');
        }
        element.push(c);
    }
    element.push('"');
    element
}
