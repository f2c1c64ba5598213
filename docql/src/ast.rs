//! The condition tree produced by the compiler and consumed by the SQL renderer.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::document::stringify;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A native table column, rendered `"table"."column"`.
    Column { table: String, column: String },
    /// A pre-rendered SQL fragment whose literals are already quoted, such as a JSON path accessor.
    Sql(String),
    /// `(expr)`
    Grouping(Box<Expr>),
    /// `expr::type`
    Cast(Box<Expr>, CastType),
    Literal(Literal),
}

impl Expr {
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column { table: table.into(), column: column.into() }
    }

    pub fn grouped(self) -> Self { Expr::Grouping(Box::new(self)) }

    pub fn cast(self, to: CastType) -> Self { Expr::Cast(Box::new(self), to) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
}

impl Literal {
    /// The native literal for a JSON value. Arrays and objects become their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Literal::String(s.clone()),
            Value::Number(n) => Literal::Number(n.clone()),
            Value::Bool(b) => Literal::Boolean(*b),
            Value::Null => Literal::Null,
            Value::Array(_) | Value::Object(_) => Literal::String(value.to_string()),
        }
    }

    /// The literal used when comparing against extracted JSON text: everything but null is stringified.
    pub fn text(value: &Value) -> Self {
        match value {
            Value::Null => Literal::Null,
            other => Literal::String(stringify(other)),
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Literal::Null) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    Numeric,
    Integer,
    Float,
}

impl CastType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CastType::Numeric => "numeric",
            CastType::Integer => "integer",
            CastType::Float => "float",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "eq")]
    Equal, // =
    #[serde(rename = "ne")]
    NotEqual, // !=
    #[serde(rename = "gt")]
    GreaterThan, // >
    #[serde(rename = "gte")]
    GreaterThanOrEqual, // >=
    #[serde(rename = "lt")]
    LessThan, // <
    #[serde(rename = "lte")]
    LessThanOrEqual, // <=
}

impl ComparisonOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison { left: Expr, operator: ComparisonOperator, right: Expr },
    In { expr: Expr, values: Vec<Literal> },
    IsNull(Expr),
    IsNotNull(Expr),
    /// Case-insensitive pattern match; `pattern` is raw and quoted at render time.
    ILike { expr: Expr, pattern: String },
    /// An arbitrary binary operator, used by custom operator combinators.
    Infix { left: Expr, operator: String, right: Expr },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    True,
    False,
}

impl Predicate {
    /// Conjunction of the given predicates, or `None` when there are none.
    pub fn all(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And(predicates)),
        }
    }

    /// Disjunction of the given predicates, or `None` when there are none.
    pub fn any(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::Or(predicates)),
        }
    }

    pub fn infix(left: Expr, operator: impl Into<String>, right: Expr) -> Self {
        Predicate::Infix { left, operator: operator.into(), right }
    }
}
