//! INSERT, UPDATE, DELETE and index DDL over a document table.
//!
//! Documents are stored whole in the payload column. Shadow-mapped fields present in a document are
//! copied into their columns as native values; mapped fields absent from the document are left out
//! of the statement entirely.

use serde_json::Value;
use tracing::debug;

use crate::ast::{Literal, Predicate};
use crate::document::{as_document, FilterDocument};
use crate::error::TranslateError;
use crate::path::PathTarget;
use crate::sql::SqlRenderer;
use crate::translator::Translator;

pub(crate) fn insert(translator: &Translator, document: &Value) -> Result<String, TranslateError> {
    let fields = as_document(document)?;
    let alias = translator.resolver.identity_alias();
    let identity = fields.get(alias).ok_or_else(|| TranslateError::MissingIdentity(alias.to_owned()))?;

    let mut columns = vec![translator.identity_column(), translator.resolver.payload_column()];
    let mut values = vec![Literal::from_json(identity), Literal::String(document.to_string())];
    for (column, value) in shadow_values(translator, fields) {
        columns.push(column);
        values.push(value);
    }

    let mut sql = SqlRenderer::new(translator.quoter());
    sql.sql("INSERT INTO ");
    sql.identifier(translator.table());
    sql.sql(" (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.sql(", ");
        }
        sql.identifier(column);
    }
    sql.sql(") VALUES (");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            sql.sql(", ");
        }
        sql.literal(value)?;
    }
    sql.sql(")");

    debug!("Translator({}).insert: {} columns", translator.table(), columns.len());
    Ok(sql.finish())
}

pub(crate) fn update(translator: &Translator, document: &Value, condition: Option<&Predicate>) -> Result<String, TranslateError> {
    let fields = as_document(document)?;

    let mut sql = SqlRenderer::new(translator.quoter());
    sql.sql("UPDATE ");
    sql.identifier(translator.table());
    sql.sql(" SET ");
    sql.identifier(translator.resolver.payload_column());
    sql.sql(" = ");
    sql.literal(&Literal::String(document.to_string()))?;
    for (column, value) in shadow_values(translator, fields) {
        sql.sql(", ");
        sql.identifier(column);
        sql.sql(" = ");
        sql.literal(&value)?;
    }
    where_clause(&mut sql, condition)?;

    debug!("Translator({}).update: filtered = {}", translator.table(), condition.is_some());
    Ok(sql.finish())
}

pub(crate) fn delete(translator: &Translator, condition: Option<&Predicate>) -> Result<String, TranslateError> {
    let mut sql = SqlRenderer::new(translator.quoter());
    sql.sql("DELETE FROM ");
    sql.identifier(translator.table());
    where_clause(&mut sql, condition)?;
    Ok(sql.finish())
}

fn where_clause(sql: &mut SqlRenderer<'_>, condition: Option<&Predicate>) -> Result<(), TranslateError> {
    if let Some(condition) = condition {
        sql.sql(" WHERE ");
        sql.predicate(condition)?;
    }
    Ok(())
}

/// `(column, value)` for every mapped field present in the document, in mapping order.
fn shadow_values<'t>(translator: &'t Translator, fields: &FilterDocument) -> Vec<(&'t str, Literal)> {
    translator.resolver.mapped().filter_map(|(field, column)| fields.get(field).map(|value| (column, Literal::from_json(value)))).collect()
}

/// A single-field index. JSON paths index their accessor expression, cast to numeric when the
/// schema declares the property numeric; identity and shadow fields index their column.
#[derive(Debug, Clone)]
pub struct Index<'a> {
    translator: &'a Translator,
    field: String,
    name: Option<String>,
    unique: bool,
    if_not_exists: bool,
}

impl<'a> Index<'a> {
    pub(crate) fn new(translator: &'a Translator, field: String) -> Self { Self { translator, field, name: None, unique: false, if_not_exists: false } }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// `<table>_<field>_idx`, with path separators replaced by underscores.
    pub fn default_name(&self) -> String { format!("{}_{}_idx", self.translator.table(), self.field.replace('.', "_")) }

    pub fn to_sql(&self) -> Result<String, TranslateError> {
        let translator = self.translator;
        let mut sql = SqlRenderer::new(translator.quoter());
        sql.sql(if self.unique { "CREATE UNIQUE INDEX " } else { "CREATE INDEX " });
        if self.if_not_exists {
            sql.sql("IF NOT EXISTS ");
        }
        sql.identifier(&self.name.clone().unwrap_or_else(|| self.default_name()));
        sql.sql(" ON ");
        sql.identifier(translator.table());
        sql.sql(" (");
        match translator.resolve(&self.field) {
            PathTarget::Identity => sql.identifier(translator.identity_column()),
            PathTarget::Shadow(column) => sql.identifier(&column),
            target @ PathTarget::JsonPath { .. } => {
                let expr = translator.resolver.ordering_expr(translator.table(), translator.identity_column(), &target, translator.quoter())?;
                sql.expr(&expr.grouped())?;
            }
        }
        sql.sql(")");

        debug!("Translator({}).index: {}", translator.table(), self.field);
        Ok(sql.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{JsonSchema, JsonType};
    use anyhow::Result;
    use serde_json::json;

    fn mapped() -> Translator { Translator::new("test").with_mapped_properties(["user_id", "created_at", "updated_at"]) }

    #[test]
    fn test_insert() -> Result<()> {
        let translator = Translator::new("test");
        let sql = translator.insert(&json!({ "_id": "abc", "name": "O'Brien" }))?;
        assert_eq!(sql, r#"INSERT INTO "test" ("id", "data") VALUES ('abc', '{"_id":"abc","name":"O''Brien"}')"#);
        Ok(())
    }

    #[test]
    fn test_insert_with_present_mapped_properties() -> Result<()> {
        let sql = mapped().insert(&json!({ "_id": 1, "user_id": 2, "created_at": "2014-01-01 00:00:00", "foo": "bar" }))?;
        assert_eq!(
            sql,
            r#"INSERT INTO "test" ("id", "data", "user_id", "created_at") VALUES (1, '{"_id":1,"user_id":2,"created_at":"2014-01-01 00:00:00","foo":"bar"}', 2, '2014-01-01 00:00:00')"#
        );
        Ok(())
    }

    #[test]
    fn test_insert_requires_identity() {
        let err = Translator::new("test").insert(&json!({ "name": "foo" })).unwrap_err();
        assert_eq!(err, TranslateError::MissingIdentity("_id".into()));
        assert_eq!(Translator::new("test").insert(&json!([1])).unwrap_err(), TranslateError::InvalidDocument("array"));
    }

    #[test]
    fn test_update() -> Result<()> {
        let translator = mapped();
        let sql = translator.find(json!({ "_id": 1 })).update_sql(&json!({ "_id": 1, "user_id": 2, "foo": "bar" }))?;
        assert_eq!(sql, r#"UPDATE "test" SET "data" = '{"_id":1,"user_id":2,"foo":"bar"}', "user_id" = 2 WHERE "test"."id" = 1"#);
        Ok(())
    }

    #[test]
    fn test_delete() -> Result<()> {
        let translator = Translator::new("test");
        assert_eq!(translator.find(json!({ "_id": "foo" })).delete_sql()?, r#"DELETE FROM "test" WHERE "test"."id" = 'foo'"#);
        assert_eq!(translator.find(json!({})).delete_sql()?, r#"DELETE FROM "test""#);
        Ok(())
    }

    #[test]
    fn test_index() -> Result<()> {
        let translator = mapped().with_schema(JsonSchema::new().with_property("weight", JsonType::Number));
        assert_eq!(translator.index("weight").to_sql()?, r#"CREATE INDEX "test_weight_idx" ON "test" (((data#>>'{weight}')::numeric))"#);
        assert_eq!(translator.index("email.address").to_sql()?, r#"CREATE INDEX "test_email_address_idx" ON "test" ((data#>>'{email,address}'))"#);
        assert_eq!(translator.index("user_id").unique().if_not_exists().to_sql()?, r#"CREATE UNIQUE INDEX IF NOT EXISTS "test_user_id_idx" ON "test" ("user_id")"#);
        assert_eq!(translator.index("_id").name("by_key").to_sql()?, r#"CREATE INDEX "by_key" ON "test" ("id")"#);
        Ok(())
    }
}
