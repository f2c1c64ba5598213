//! Literal and identifier quoting.
//!
//! The compiler never concatenates raw strings into SQL: every literal (including JSON path
//! segments) passes through a [`Quoter`], and the result is checked before it is used.

use crate::error::TranslateError;

/// Escapes values for safe embedding in SQL text. Implementations must be pure.
pub trait Quoter: Send + Sync {
    /// Quotes `raw` as a string literal, including the surrounding quotes.
    fn quote(&self, raw: &str) -> String;

    /// Quotes `raw` as an identifier.
    fn quote_identifier(&self, raw: &str) -> String { format!(r#""{}""#, raw.replace('"', "\"\"")) }
}

/// Quoting for PostgreSQL with `standard_conforming_strings` on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresQuoter;

impl Quoter for PostgresQuoter {
    fn quote(&self, raw: &str) -> String {
        let mut buffer = String::with_capacity(raw.len() + 2);
        buffer.push('\'');
        for c in raw.chars() {
            match c {
                '\'' => buffer.push_str("''"),
                _ => buffer.push(c),
            }
        }
        buffer.push('\'');
        buffer
    }
}

/// A literal that has been quoted and verified to contain no unescaped quote characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedLiteral(String);

impl EscapedLiteral {
    pub fn verify(quoted: String) -> Result<Self, TranslateError> {
        if is_escaped(&quoted) {
            Ok(Self(quoted))
        } else {
            Err(TranslateError::UnsafeLiteral(quoted))
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl AsRef<str> for EscapedLiteral {
    fn as_ref(&self) -> &str { &self.0 }
}

pub fn quote_literal(quoter: &dyn Quoter, raw: &str) -> Result<EscapedLiteral, TranslateError> { EscapedLiteral::verify(quoter.quote(raw)) }

/// Accepts `'...'` with every interior quote doubled, and `E'...'` which additionally allows backslash escapes.
/// Null bytes are never accepted: Postgres text cannot hold them.
fn is_escaped(quoted: &str) -> bool {
    if quoted.contains('\0') {
        return false;
    }
    let trimmed = quoted.trim_start();
    let (backslash_escapes, rest) = match trimmed.strip_prefix(['E', 'e']) {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let Some(inner) = rest.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) else {
        return false;
    };

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if backslash_escapes => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '\'' => {
                if chars.next() != Some('\'') {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}
