use thiserror::Error;

/// Errors raised while translating a filter document (or a statement built from one) into SQL.
///
/// Every variant is raised when the condition tree is first built, never deferred to execution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslateError {
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    #[error("{0} requires at least one filter document")]
    EmptyCombinator(String),
    #[error("Operator clause supplies more than one operator: {}", .0.join(", "))]
    AmbiguousOperatorClause(Vec<String>),
    #[error("Invalid operand for {operator}: {reason}")]
    InvalidOperand { operator: String, reason: &'static str },
    #[error("Filter document must be an object, got {0}")]
    InvalidDocument(&'static str),
    #[error("Invalid sort direction for {0}")]
    InvalidSort(String),
    #[error("Document is missing its identity field {0}")]
    MissingIdentity(String),
    #[error("Quoter produced an unescaped literal: {0}")]
    UnsafeLiteral(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranslateError {
    pub(crate) fn invalid_operand(operator: impl Into<String>, reason: &'static str) -> Self {
        TranslateError::InvalidOperand { operator: operator.into(), reason }
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self { TranslateError::Config(err.to_string()) }
}
