//! Operator tokens: the built-in set plus a registry of custom operators checked before it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::{ComparisonOperator, Expr, Literal, Predicate};
use crate::error::TranslateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOperator {
    /// `$in`
    In,
    /// `$contains`, only meaningful against JSON paths.
    Contains,
    /// `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`
    Compare(ComparisonOperator),
}

impl BuiltinOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "$in" => BuiltinOperator::In,
            "$contains" => BuiltinOperator::Contains,
            "$eq" => BuiltinOperator::Compare(ComparisonOperator::Equal),
            "$ne" => BuiltinOperator::Compare(ComparisonOperator::NotEqual),
            "$gt" => BuiltinOperator::Compare(ComparisonOperator::GreaterThan),
            "$gte" => BuiltinOperator::Compare(ComparisonOperator::GreaterThanOrEqual),
            "$lt" => BuiltinOperator::Compare(ComparisonOperator::LessThan),
            "$lte" => BuiltinOperator::Compare(ComparisonOperator::LessThanOrEqual),
            _ => return None,
        })
    }
}

/// Builds a predicate from the (already coerced) left-hand expression and the operand.
pub type Combinator = Arc<dyn Fn(Expr, Literal) -> Predicate + Send + Sync>;

#[derive(Clone)]
pub enum CustomOperator {
    /// Behaves exactly like the built-in comparison, including type coercion.
    Compare(ComparisonOperator),
    Combinator(Combinator),
}

impl CustomOperator {
    pub fn combinator<F>(f: F) -> Self
    where F: Fn(Expr, Literal) -> Predicate + Send + Sync + 'static {
        CustomOperator::Combinator(Arc::new(f))
    }

    /// A combinator rendering `left <operator> right`, e.g. `infix("&&")`.
    pub fn infix(operator: impl Into<String>) -> Self {
        let operator = operator.into();
        Self::combinator(move |left, right| Predicate::infix(left, operator.clone(), Expr::Literal(right)))
    }
}

impl fmt::Debug for CustomOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomOperator::Compare(op) => f.debug_tuple("Compare").field(op).finish(),
            CustomOperator::Combinator(_) => f.write_str("Combinator(..)"),
        }
    }
}

impl From<ComparisonOperator> for CustomOperator {
    fn from(op: ComparisonOperator) -> Self { CustomOperator::Compare(op) }
}

/// The handler a token dispatches to.
#[derive(Debug, Clone)]
pub enum Operator<'a> {
    Custom(&'a CustomOperator),
    Builtin(BuiltinOperator),
}

#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    custom: HashMap<String, CustomOperator>,
}

impl OperatorRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, token: impl Into<String>, operator: impl Into<CustomOperator>) -> Result<(), TranslateError> {
        let token = token.into();
        if !crate::document::is_operator(&token) {
            return Err(TranslateError::Config(format!("custom operator {} must start with $", token)));
        }
        self.custom.insert(token, operator.into());
        Ok(())
    }

    /// Custom operators shadow built-ins with the same token.
    pub fn resolve(&self, token: &str) -> Result<Operator<'_>, TranslateError> {
        if let Some(custom) = self.custom.get(token) {
            return Ok(Operator::Custom(custom));
        }
        BuiltinOperator::from_token(token).map(Operator::Builtin).ok_or_else(|| TranslateError::UnsupportedOperator(token.to_owned()))
    }

    pub fn len(&self) -> usize { self.custom.len() }

    pub fn is_empty(&self) -> bool { self.custom.is_empty() }
}
