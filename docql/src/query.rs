use std::sync::OnceLock;

use serde_json::Value;
use tracing::debug;

use crate::ast::{Expr, Predicate};
use crate::error::TranslateError;
use crate::path::PathTarget;
use crate::sql::SqlRenderer;
use crate::statement;
use crate::translator::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Reads a MongoDB-style direction: a positive number (or `"asc"`) ascends, a negative one (or `"desc"`) descends.
    pub fn from_json(field: &str, value: &Value) -> Result<Self, TranslateError> {
        match value {
            Value::Number(n) if n.as_f64().is_some_and(|n| n > 0.0) => Ok(SortDirection::Asc),
            Value::Number(n) if n.as_f64().is_some_and(|n| n < 0.0) => Ok(SortDirection::Desc),
            Value::String(s) if s.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
            Value::String(s) if s.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
            _ => Err(TranslateError::InvalidSort(field.to_owned())),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A filter over one translator's table plus the projection, ordering and paging applied to it.
///
/// The condition tree is compiled once, on first use, and reused by every statement rendered from
/// the query. Compilation errors surface from whichever method first needs the condition.
#[derive(Debug)]
pub struct Query<'a> {
    translator: &'a Translator,
    filter: Value,
    condition: OnceLock<Result<Option<Predicate>, TranslateError>>,
    projection: Option<Vec<String>>,
    sort: Vec<Value>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(translator: &'a Translator, filter: Value) -> Self {
        Self { translator, filter, condition: OnceLock::new(), projection: None, sort: Vec::new(), limit: None, offset: None }
    }

    /// Appends a sort document such as `{"name": -1, "email": 1}`; keys are applied in order.
    pub fn sort(mut self, spec: impl Into<Value>) -> Self {
        self.sort.push(spec.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Projects the given fields instead of the payload column.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(&self) -> &Value { &self.filter }

    /// The compiled condition, `None` for an empty filter. Built once and memoized.
    pub fn condition(&self) -> Result<Option<&Predicate>, TranslateError> {
        let compiled = self.condition.get_or_init(|| {
            debug!("Query({}).condition: compiling {}", self.translator.table, self.filter);
            self.translator.compile(&self.filter)
        });
        match compiled {
            Ok(condition) => Ok(condition.as_ref()),
            Err(err) => Err(err.clone()),
        }
    }

    pub fn to_sql(&self) -> Result<String, TranslateError> {
        let mut sql = SqlRenderer::new(self.translator.quoter());
        sql.sql("SELECT ");
        match &self.projection {
            None => sql.expr(&Expr::column(self.translator.table(), self.translator.resolver.payload_column()))?,
            Some(fields) => {
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        sql.sql(", ");
                    }
                    sql.expr(&self.field_expr(field)?)?;
                }
            }
        }
        sql.sql(" FROM ");
        sql.identifier(self.translator.table());
        self.where_clause(&mut sql)?;
        self.order_by(&mut sql)?;
        if let Some(limit) = self.limit {
            sql.sql(format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.sql(format!(" OFFSET {}", offset));
        }
        Ok(sql.finish())
    }

    pub fn count_sql(&self) -> Result<String, TranslateError> {
        let mut sql = SqlRenderer::new(self.translator.quoter());
        sql.sql("SELECT COUNT(*) FROM ");
        sql.identifier(self.translator.table());
        self.where_clause(&mut sql)?;
        Ok(sql.finish())
    }

    /// Replaces the payload (and present mapped columns) of every matching row with `document`.
    pub fn update_sql(&self, document: &Value) -> Result<String, TranslateError> { statement::update(self.translator, document, self.condition()?) }

    pub fn delete_sql(&self) -> Result<String, TranslateError> { statement::delete(self.translator, self.condition()?) }

    pub(crate) fn where_clause(&self, sql: &mut SqlRenderer<'_>) -> Result<(), TranslateError> {
        if let Some(condition) = self.condition()? {
            sql.sql(" WHERE ");
            sql.predicate(condition)?;
        }
        Ok(())
    }

    fn order_by(&self, sql: &mut SqlRenderer<'_>) -> Result<(), TranslateError> {
        let mut first = true;
        for spec in &self.sort {
            let Value::Object(fields) = spec else {
                return Err(TranslateError::InvalidSort(spec.to_string()));
            };
            for (field, direction) in fields {
                let direction = SortDirection::from_json(field, direction)?;
                sql.sql(if first { " ORDER BY " } else { ", " });
                first = false;
                sql.expr(&self.field_expr(field)?)?;
                sql.sql(" ");
                sql.sql(direction.as_sql());
            }
        }
        Ok(())
    }

    fn field_expr(&self, field: &str) -> Result<Expr, TranslateError> {
        let target: PathTarget = self.translator.resolve(field);
        self.translator.resolver.ordering_expr(self.translator.table(), self.translator.identity_column(), &target, self.translator.quoter())
    }
}
