//! Compiles filter documents into condition trees.
//!
//! Keys of a document are AND-ed in document order. `$and`/`$or` recurse into their child
//! documents. Every other key resolves to a [`PathTarget`]:
//!
//! - identity and shadow columns hold native values and are compared directly;
//! - JSON paths extract text from the payload column, so operands are coerced: numeric operands
//!   cast the extracted text, everything else is compared as text. With a schema the declared
//!   type of the top-level property decides instead.
//!
//! A null operand always renders `(<expr>) IS NULL`: Postgres rejects `IS NULL` applied directly
//! to a `#>>` extraction, so the raw accessor is parenthesized first.

use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::ast::{CastType, ComparisonOperator, Expr, Literal, Predicate};
use crate::config::{MultipleOperators, NumericCast};
use crate::document::{as_document, is_operator, is_operator_clause, stringify, FilterDocument};
use crate::error::TranslateError;
use crate::operators::{BuiltinOperator, CustomOperator, Operator};
use crate::path::PathTarget;
use crate::schema::JsonType;
use crate::translator::Translator;

/// How operands against a JSON path are coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coercion {
    /// No schema: the runtime type of each operand decides.
    Dynamic,
    /// Declared string: always text.
    Text,
    /// Declared number or integer: always `::numeric`.
    Numeric,
    /// Declared array: `$in` becomes substring containment, everything else behaves as `Untyped`.
    Array,
    /// Declared with any other type, or undeclared: numeric operands cast, others compare as text.
    Untyped,
}

impl Coercion {
    fn from_declared(declared: Option<JsonType>) -> Self {
        match declared {
            None => Coercion::Dynamic,
            Some(JsonType::String) => Coercion::Text,
            Some(JsonType::Number | JsonType::Integer) => Coercion::Numeric,
            Some(JsonType::Array) => Coercion::Array,
            Some(_) => Coercion::Untyped,
        }
    }
}

pub struct ConditionCompiler<'a> {
    translator: &'a Translator,
}

impl<'a> ConditionCompiler<'a> {
    pub fn new(translator: &'a Translator) -> Self { Self { translator } }

    /// Compiles a document into one condition; `None` when the document has no keys.
    pub fn compile(&self, document: &FilterDocument) -> Result<Option<Predicate>, TranslateError> {
        let conditions = document.iter().map(|(key, value)| self.field(key, value)).collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate::all(conditions))
    }

    fn field(&self, key: &str, value: &Value) -> Result<Predicate, TranslateError> {
        match key {
            "$and" => self.combinator(key, value, Predicate::all),
            "$or" => self.combinator(key, value, Predicate::any),
            key if is_operator(key) => Err(TranslateError::UnsupportedOperator(key.to_owned())),
            _ => match self.translator.resolver.resolve(key) {
                PathTarget::Identity => self.scalar_leaf(Expr::column(&self.translator.table, &self.translator.identity_column), value),
                PathTarget::Shadow(column) => self.scalar_leaf(Expr::column(&self.translator.table, column), value),
                PathTarget::JsonPath { segments, numeric } => self.json_leaf(&segments, numeric, value),
            },
        }
    }

    fn combinator(&self, key: &str, value: &Value, combine: fn(Vec<Predicate>) -> Option<Predicate>) -> Result<Predicate, TranslateError> {
        let Value::Array(documents) = value else {
            return Err(TranslateError::invalid_operand(key, "expected an array of filter documents"));
        };

        let children = documents
            .iter()
            .map(|document| -> Result<Predicate, TranslateError> { Ok(self.compile(as_document(document)?)?.unwrap_or(Predicate::True)) })
            .collect::<Result<Vec<_>, _>>()?;
        combine(children).ok_or_else(|| TranslateError::EmptyCombinator(key.to_owned()))
    }

    /// Operator clauses yield their (token, operand) pairs; any other value is an implicit `$eq`.
    fn operator_clause<'v>(&self, value: &'v Value) -> Result<Option<&'v Map<String, Value>>, TranslateError> {
        let Value::Object(mapping) = value else {
            return Ok(None);
        };
        if !is_operator_clause(mapping) {
            return Ok(None);
        }
        if self.translator.multiple_operators == MultipleOperators::Reject && mapping.len() > 1 {
            return Err(TranslateError::AmbiguousOperatorClause(mapping.keys().cloned().collect()));
        }
        Ok(Some(mapping))
    }

    // --- identity and shadow columns ---

    fn scalar_leaf(&self, column: Expr, value: &Value) -> Result<Predicate, TranslateError> {
        let Some(clause) = self.operator_clause(value)? else {
            trace!("scalar leaf {:?} = {}", column, value);
            return compare(column, ComparisonOperator::Equal, Literal::from_json(value), "$eq");
        };

        let predicates = clause
            .iter()
            .map(|(token, operand)| self.scalar_operator(&column, token, operand))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate::all(predicates).unwrap_or(Predicate::True))
    }

    fn scalar_operator(&self, column: &Expr, token: &str, operand: &Value) -> Result<Predicate, TranslateError> {
        let operator = self.translator.registry.resolve(token)?;
        match &operator {
            Operator::Custom(CustomOperator::Compare(op)) | Operator::Builtin(BuiltinOperator::Compare(op)) => {
                compare(column.clone(), *op, Literal::from_json(operand), token)
            }
            Operator::Custom(CustomOperator::Combinator(combinator)) => Ok(combinator(column.clone(), Literal::from_json(operand))),
            Operator::Builtin(BuiltinOperator::In) => {
                let candidates = candidates(token, operand)?.iter().map(Literal::from_json).collect();
                Ok(membership(column.clone(), column.clone(), candidates))
            }
            Operator::Builtin(BuiltinOperator::Contains) => Err(TranslateError::UnsupportedOperator(token.to_owned())),
        }
    }

    // --- JSON paths ---

    fn json_leaf(&self, segments: &[String], numeric: bool, value: &Value) -> Result<Predicate, TranslateError> {
        let path = self.translator.resolver.accessor(segments, self.translator.quoter.as_ref())?;
        let coercion = if numeric { Coercion::Numeric } else { Coercion::from_declared(self.translator.resolver.declared_type(&segments[0])) };

        let Some(clause) = self.operator_clause(value)? else {
            trace!("json leaf {} = {} ({:?})", segments.join("."), value, coercion);
            let (expr, literal) = self.coerce(&path, coercion, value);
            return compare(expr, ComparisonOperator::Equal, literal, "$eq");
        };

        let predicates = clause
            .iter()
            .map(|(token, operand)| self.json_operator(&path, coercion, token, operand))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate::all(predicates).unwrap_or(Predicate::True))
    }

    fn json_operator(&self, path: &Expr, coercion: Coercion, token: &str, operand: &Value) -> Result<Predicate, TranslateError> {
        let operator = self.translator.registry.resolve(token)?;
        match &operator {
            Operator::Custom(CustomOperator::Compare(op)) | Operator::Builtin(BuiltinOperator::Compare(op)) => {
                let (expr, literal) = self.coerce(path, coercion, operand);
                compare(expr, *op, literal, token)
            }
            Operator::Custom(CustomOperator::Combinator(combinator)) => {
                let (expr, _) = self.coerce(path, coercion, operand);
                Ok(combinator(expr, Literal::from_json(operand)))
            }
            Operator::Builtin(BuiltinOperator::In) => self.json_in(path, coercion, candidates(token, operand)?),
            Operator::Builtin(BuiltinOperator::Contains) => {
                let members = match operand {
                    Value::Array(members) => members.as_slice(),
                    single => std::slice::from_ref(single),
                };
                Ok(contains_any(path, members))
            }
        }
    }

    fn json_in(&self, path: &Expr, coercion: Coercion, candidates: &[Value]) -> Result<Predicate, TranslateError> {
        let null_expr = path.clone().grouped();
        let numeric_cast = match coercion {
            Coercion::Array => return Ok(contains_any(path, candidates)),
            Coercion::Text => None,
            Coercion::Numeric => Some(CastType::Numeric),
            Coercion::Dynamic | Coercion::Untyped => {
                let mut numbers = candidates.iter().filter(|candidate| !candidate.is_null()).peekable();
                let all_numeric = numbers.peek().is_some() && numbers.all(Value::is_number);
                match (all_numeric, coercion) {
                    (false, _) => None,
                    (true, Coercion::Dynamic) => Some(self.list_cast(candidates)),
                    (true, _) => Some(CastType::Numeric),
                }
            }
        };

        Ok(match numeric_cast {
            Some(cast) => membership(path.clone().grouped().cast(cast), null_expr, candidates.iter().map(Literal::from_json).collect()),
            None => {
                let expr = if coercion == Coercion::Dynamic { path.clone() } else { path.clone().grouped() };
                membership(expr, null_expr, candidates.iter().map(Literal::text).collect())
            }
        })
    }

    /// The left-hand expression and literal for comparing a JSON path against one operand.
    fn coerce(&self, path: &Expr, coercion: Coercion, operand: &Value) -> (Expr, Literal) {
        if operand.is_null() {
            return (path.clone().grouped(), Literal::Null);
        }

        let cast = match (coercion, operand) {
            (Coercion::Dynamic, Value::Number(n)) => Some(self.scalar_cast(n)),
            (Coercion::Dynamic | Coercion::Text, _) => None,
            (Coercion::Numeric, _) => Some(CastType::Numeric),
            (Coercion::Array | Coercion::Untyped, Value::Number(_)) => Some(CastType::Numeric),
            (Coercion::Array | Coercion::Untyped, _) => None,
        };

        match (cast, coercion) {
            (Some(cast), _) => (path.clone().grouped().cast(cast), Literal::from_json(operand)),
            (None, Coercion::Dynamic) => (path.clone(), Literal::text(operand)),
            (None, _) => (path.clone().grouped(), Literal::text(operand)),
        }
    }

    fn scalar_cast(&self, number: &Number) -> CastType {
        match self.translator.numeric_cast {
            NumericCast::Numeric => CastType::Numeric,
            NumericCast::ByLiteral if number.is_f64() => CastType::Float,
            NumericCast::ByLiteral => CastType::Integer,
        }
    }

    /// One cast for a whole `$in` list: float if any candidate is floating point.
    fn list_cast(&self, candidates: &[Value]) -> CastType {
        match self.translator.numeric_cast {
            NumericCast::Numeric => CastType::Numeric,
            NumericCast::ByLiteral if candidates.iter().any(Value::is_f64) => CastType::Float,
            NumericCast::ByLiteral => CastType::Integer,
        }
    }
}

fn compare(left: Expr, operator: ComparisonOperator, literal: Literal, token: &str) -> Result<Predicate, TranslateError> {
    if literal.is_null() {
        return match operator {
            ComparisonOperator::Equal => Ok(Predicate::IsNull(left)),
            ComparisonOperator::NotEqual => Ok(Predicate::IsNotNull(left)),
            _ => Err(TranslateError::invalid_operand(token, "ordering comparisons against null are not supported")),
        };
    }
    Ok(Predicate::Comparison { left, operator, right: Expr::Literal(literal) })
}

fn candidates<'v>(token: &str, operand: &'v Value) -> Result<&'v [Value], TranslateError> {
    match operand {
        Value::Array(candidates) => Ok(candidates),
        _ => Err(TranslateError::invalid_operand(token, "expected an array of candidates")),
    }
}

/// `expr IN (...)`, with null candidates split out into `null_expr IS NULL`. No candidates match nothing.
fn membership(expr: Expr, null_expr: Expr, candidates: Vec<Literal>) -> Predicate {
    let (nulls, values): (Vec<Literal>, Vec<Literal>) = candidates.into_iter().partition(Literal::is_null);

    let mut alternatives = Vec::with_capacity(2);
    if !values.is_empty() {
        alternatives.push(Predicate::In { expr, values });
    }
    if !nulls.is_empty() {
        alternatives.push(Predicate::IsNull(null_expr));
    }
    Predicate::any(alternatives).unwrap_or(Predicate::False)
}

/// Approximates array membership in serialized JSON: an `ILIKE '%"<member>"%'` per member, OR-ed.
/// Members are always quoted so `1` cannot match inside `10`.
fn contains_any(path: &Expr, members: &[Value]) -> Predicate {
    let checks = members
        .iter()
        .map(|member| {
            let quoted = Value::String(stringify(member)).to_string();
            Predicate::ILike { expr: path.clone(), pattern: format!("%{}%", escape_like(&quoted)) }
        })
        .collect();
    Predicate::any(checks).unwrap_or(Predicate::False)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
