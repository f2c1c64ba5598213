use crate::ast::{Expr, Literal, Predicate};
use crate::error::TranslateError;
use crate::quote::{quote_literal, Quoter};

/// Flattens condition trees into SQL text, quoting every literal through the configured [`Quoter`].
pub struct SqlRenderer<'a> {
    quoter: &'a dyn Quoter,
    buffer: String,
}

impl<'a> SqlRenderer<'a> {
    pub fn new(quoter: &'a dyn Quoter) -> Self { Self { quoter, buffer: String::new() } }

    pub fn sql(&mut self, s: impl AsRef<str>) { self.buffer.push_str(s.as_ref()); }

    pub fn identifier(&mut self, name: &str) { self.buffer.push_str(&self.quoter.quote_identifier(name)); }

    pub fn finish(self) -> String { self.buffer }

    pub fn literal(&mut self, literal: &Literal) -> Result<(), TranslateError> {
        match literal {
            Literal::String(s) => {
                let quoted = quote_literal(self.quoter, s)?;
                self.sql(quoted);
            }
            Literal::Number(n) => self.sql(n.to_string()),
            Literal::Boolean(true) => self.sql("TRUE"),
            Literal::Boolean(false) => self.sql("FALSE"),
            Literal::Null => self.sql("NULL"),
        }
        Ok(())
    }

    pub fn expr(&mut self, expr: &Expr) -> Result<(), TranslateError> {
        match expr {
            Expr::Column { table, column } => {
                self.identifier(table);
                self.sql(".");
                self.identifier(column);
            }
            Expr::Sql(sql) => self.sql(sql),
            Expr::Grouping(inner) => {
                self.sql("(");
                self.expr(inner)?;
                self.sql(")");
            }
            Expr::Cast(inner, to) => {
                self.expr(inner)?;
                self.sql("::");
                self.sql(to.as_sql());
            }
            Expr::Literal(literal) => self.literal(literal)?,
        }
        Ok(())
    }

    pub fn predicate(&mut self, predicate: &Predicate) -> Result<(), TranslateError> {
        match predicate {
            Predicate::Comparison { left, operator, right } => {
                self.expr(left)?;
                self.sql(" ");
                self.sql(operator.as_sql());
                self.sql(" ");
                self.expr(right)?;
            }
            Predicate::In { values, .. } if values.is_empty() => self.sql("FALSE"),
            Predicate::In { expr, values } => {
                self.expr(expr)?;
                self.sql(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql(", ");
                    }
                    self.literal(value)?;
                }
                self.sql(")");
            }
            Predicate::IsNull(expr) => {
                self.expr(expr)?;
                self.sql(" IS NULL");
            }
            Predicate::IsNotNull(expr) => {
                self.expr(expr)?;
                self.sql(" IS NOT NULL");
            }
            Predicate::ILike { expr, pattern } => {
                self.expr(expr)?;
                self.sql(" ILIKE ");
                let quoted = quote_literal(self.quoter, pattern)?;
                self.sql(quoted);
            }
            Predicate::Infix { left, operator, right } => {
                self.expr(left)?;
                self.sql(" ");
                self.sql(operator);
                self.sql(" ");
                self.expr(right)?;
            }
            Predicate::And(predicates) => {
                for (i, predicate) in predicates.iter().enumerate() {
                    if i > 0 {
                        self.sql(" AND ");
                    }
                    self.predicate(predicate)?;
                }
            }
            Predicate::Or(predicates) => {
                self.sql("(");
                for (i, predicate) in predicates.iter().enumerate() {
                    if i > 0 {
                        self.sql(" OR ");
                    }
                    self.predicate(predicate)?;
                }
                self.sql(")");
            }
            Predicate::True => self.sql("TRUE"),
            Predicate::False => self.sql("FALSE"),
        }
        Ok(())
    }
}

pub fn render_predicate(predicate: &Predicate, quoter: &dyn Quoter) -> Result<String, TranslateError> {
    let mut sql = SqlRenderer::new(quoter);
    sql.predicate(predicate)?;
    Ok(sql.finish())
}
