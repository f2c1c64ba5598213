//! Compiles MongoDB-style filter documents into SQL over a table of JSON documents.
//!
//! A table holds an identity column, a JSON payload column and optionally some shadow columns
//! that copy payload fields as native values. A [`Translator`] is configured once per table and
//! compiles filters such as `{"weight": {"$gt": 66}, "$or": [{"tag": "a"}, {"tag": "b"}]}` into a
//! [`Predicate`] tree, which renders as a WHERE clause or feeds the statement shapes of [`Query`].

pub mod ast;
pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod operators;
pub mod path;
pub mod query;
pub mod quote;
pub mod schema;
pub mod sql;
pub mod statement;
pub mod translator;

pub use ast::{CastType, ComparisonOperator, Expr, Literal, Predicate};
pub use config::{MappedProperties, MultipleOperators, NumericCast, TranslatorConfig};
pub use error::TranslateError;
pub use operators::CustomOperator;
pub use path::{PathStyle, PathTarget};
pub use query::{Query, SortDirection};
pub use quote::{EscapedLiteral, PostgresQuoter, Quoter};
pub use schema::{JsonSchema, JsonType, SchemaLookup};
pub use statement::Index;
pub use translator::Translator;
