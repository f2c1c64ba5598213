use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::ast::Predicate;
use crate::compiler::ConditionCompiler;
use crate::config::{MultipleOperators, NumericCast, TranslatorConfig};
use crate::document::as_document;
use crate::error::TranslateError;
use crate::operators::{CustomOperator, OperatorRegistry};
use crate::path::{PathResolver, PathStyle, PathTarget};
use crate::query::Query;
use crate::quote::{PostgresQuoter, Quoter};
use crate::schema::{JsonSchema, SchemaLookup};
use crate::sql::render_predicate;
use crate::statement::{self, Index};

/// Translates filter documents against one table of JSON documents.
///
/// A translator is configured once and then shared read-only; every query it builds is independent.
///
/// ```rust
/// use docql::Translator;
/// use serde_json::json;
///
/// let translator = Translator::new("test");
/// let sql = translator.find(json!({ "name": "foo" })).limit(1).to_sql().unwrap();
/// assert_eq!(sql, r#"SELECT "test"."data" FROM "test" WHERE data#>>'{name}' = 'foo' LIMIT 1"#);
/// ```
#[derive(Clone)]
pub struct Translator {
    pub(crate) table: String,
    pub(crate) identity_column: String,
    pub(crate) resolver: PathResolver,
    pub(crate) registry: OperatorRegistry,
    pub(crate) quoter: Arc<dyn Quoter>,
    pub(crate) numeric_cast: NumericCast,
    pub(crate) multiple_operators: MultipleOperators,
}

impl Translator {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            identity_column: "id".into(),
            resolver: PathResolver::new(),
            registry: OperatorRegistry::new(),
            quoter: Arc::new(PostgresQuoter),
            numeric_cast: NumericCast::default(),
            multiple_operators: MultipleOperators::default(),
        }
    }

    pub fn from_config(config: TranslatorConfig) -> Result<Self, TranslateError> {
        config.validate()?;
        let mut translator = Translator::new(config.table)
            .with_identity_column(config.identity_column)
            .with_identity_alias(config.identity_alias)
            .with_payload_column(config.payload_column)
            .with_path_style(config.path_style)
            .with_numeric_cast(config.numeric_cast)
            .with_multiple_operators(config.multiple_operators);
        for (field, column) in config.mapped_properties.into_columns() {
            translator.resolver.map_property(field, column);
        }
        for (token, operator) in config.custom_operators {
            translator.registry.register(token, operator)?;
        }
        if let Some(schema) = config.schema {
            translator = translator.with_schema(JsonSchema::from_value(&schema)?);
        }
        debug!("Translator({}) configured: {} mapped properties, {} custom operators", translator.table, translator.resolver.mapped().count(), translator.registry.len());
        Ok(translator)
    }

    pub fn with_schema(mut self, schema: impl SchemaLookup + 'static) -> Self {
        self.resolver.set_schema(Arc::new(schema));
        self
    }

    /// Shadow columns named after their fields.
    pub fn with_mapped_properties<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            self.resolver.map_property(field.clone(), field);
        }
        self
    }

    pub fn with_mapped_property(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.resolver.map_property(field.into(), column.into());
        self
    }

    pub fn with_custom_operator(mut self, token: impl Into<String>, operator: impl Into<CustomOperator>) -> Result<Self, TranslateError> {
        self.registry.register(token, operator)?;
        Ok(self)
    }

    pub fn with_quoter(mut self, quoter: impl Quoter + 'static) -> Self {
        self.quoter = Arc::new(quoter);
        self
    }

    pub fn with_identity_column(mut self, column: impl Into<String>) -> Self {
        self.identity_column = column.into();
        self
    }

    pub fn with_identity_alias(mut self, alias: impl Into<String>) -> Self {
        self.resolver.set_identity_alias(alias.into());
        self
    }

    pub fn with_payload_column(mut self, column: impl Into<String>) -> Self {
        self.resolver.set_payload_column(column.into());
        self
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.resolver.set_style(style);
        self
    }

    pub fn with_numeric_cast(mut self, numeric_cast: NumericCast) -> Self {
        self.numeric_cast = numeric_cast;
        self
    }

    pub fn with_multiple_operators(mut self, policy: MultipleOperators) -> Self {
        self.multiple_operators = policy;
        self
    }

    pub fn table(&self) -> &str { &self.table }

    pub fn identity_column(&self) -> &str { &self.identity_column }

    pub fn resolver(&self) -> &PathResolver { &self.resolver }

    pub fn quoter(&self) -> &dyn Quoter { self.quoter.as_ref() }

    pub fn resolve(&self, field: &str) -> PathTarget { self.resolver.resolve(field) }

    /// Starts a query. The filter is compiled on first use.
    pub fn find(&self, filter: impl Into<Value>) -> Query<'_> { Query::new(self, filter.into()) }

    /// Compiles a filter into a condition tree; `None` for an empty filter.
    pub fn compile(&self, filter: &Value) -> Result<Option<Predicate>, TranslateError> {
        let document = as_document(filter)?;
        ConditionCompiler::new(self).compile(document)
    }

    /// Renders a filter as the text of a WHERE clause, without the keyword. Empty filters render as an empty string.
    pub fn where_clause(&self, filter: &Value) -> Result<String, TranslateError> {
        match self.compile(filter)? {
            Some(predicate) => render_predicate(&predicate, self.quoter()),
            None => Ok(String::new()),
        }
    }

    pub fn insert(&self, document: &Value) -> Result<String, TranslateError> { statement::insert(self, document) }

    pub fn index(&self, field: impl Into<String>) -> Index<'_> { Index::new(self, field.into()) }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("table", &self.table)
            .field("identity_column", &self.identity_column)
            .field("resolver", &self.resolver)
            .field("registry", &self.registry)
            .field("numeric_cast", &self.numeric_cast)
            .field("multiple_operators", &self.multiple_operators)
            .finish_non_exhaustive()
    }
}
