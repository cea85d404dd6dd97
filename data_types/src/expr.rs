//! A minimal expression AST shared by partition keys, sorting keys, skip
//! indices and TTL declarations.
//!
//! This is intentionally far smaller than a general SQL expression tree —
//! the write path only ever needs to evaluate the handful of shapes a
//! partition/TTL expression can take (a bare column, or a column combined
//! with a literal via a small set of operators). Evaluation against a
//! `RecordBatch` lives in the `predicate` crate so `data_types` stays free
//! of an `arrow` dependency.

use crate::value::Value;

/// An expression over block columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare column reference.
    Column(String),
    /// A constant value.
    Literal(Value),
    /// `lhs % rhs`
    Modulo(Box<Expr>, Box<Expr>),
    /// `lhs + rhs`
    Add(Box<Expr>, Box<Expr>),
    /// `lhs - rhs`
    Sub(Box<Expr>, Box<Expr>),
    /// Truncate a timestamp column to a calendar bucket, e.g. `toYYYYMM(ts)`,
    /// used to build date-based partition keys.
    ToStartOfMonth(Box<Expr>),
    /// Truncate a timestamp column to the day, used for date-based
    /// partition keys such as the default `toDate(time)`.
    ToDate(Box<Expr>),
}

impl Expr {
    /// A convenience constructor for the common "just a column" case.
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    /// The output column name this expression would be materialized under,
    /// if it needs a computed column at all (bare column references don't).
    pub fn output_name(&self) -> String {
        match self {
            Expr::Column(name) => name.clone(),
            other => format!("{other:?}"),
        }
    }

    /// Every block column this expression reads from, transitively — e.g.
    /// `k % 2` references `k`. Used by the MinMax indexer to cover the
    /// columns a computed partition key is actually built on, not just a
    /// bare top-level column reference.
    pub fn referenced_columns(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_referenced_columns(&mut out);
        out
    }

    fn collect_referenced_columns(&self, out: &mut Vec<String>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Literal(_) => {}
            Expr::Modulo(l, r) | Expr::Add(l, r) | Expr::Sub(l, r) => {
                l.collect_referenced_columns(out);
                r.collect_referenced_columns(out);
            }
            Expr::ToStartOfMonth(inner) | Expr::ToDate(inner) => {
                inner.collect_referenced_columns(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_columns_of_bare_column() {
        assert_eq!(Expr::column("k").referenced_columns(), vec!["k".to_string()]);
    }

    #[test]
    fn referenced_columns_of_computed_expression() {
        let expr = Expr::Modulo(Box::new(Expr::column("k")), Box::new(Expr::Literal(Value::I64(2))));
        assert_eq!(expr.referenced_columns(), vec!["k".to_string()]);
    }

    #[test]
    fn referenced_columns_of_nested_calendar_function() {
        let expr = Expr::ToStartOfMonth(Box::new(Expr::ToDate(Box::new(Expr::column("time")))));
        assert_eq!(expr.referenced_columns(), vec!["time".to_string()]);
    }
}
