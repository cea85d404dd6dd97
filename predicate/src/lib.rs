//! Evaluating a [`data_types::Expr`] against a [`mutable_batch::Block`].
//!
//! This is intentionally not a general SQL expression evaluator: the AST in
//! `data_types::Expr` only covers the handful of shapes a partition key,
//! sorting key, skip index or TTL expression actually needs (column
//! reference, literal, arithmetic, and the two Graphite/TTL calendar
//! functions), so evaluation is a small direct recursion rather than a
//! DataFusion physical plan.

pub mod codec;

use arrow::array::Array;
use data_types::{Expr, Value};
use mutable_batch::{value::try_value_at, Block};
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("column {} not found in block", name))]
    MissingColumn { name: String },

    #[snafu(display("{} cannot be applied to operand of type {:?}", op, value))]
    TypeMismatch { op: &'static str, value: Value },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Evaluate `expr` for row `row` of `block`, producing a single scalar.
pub fn eval(expr: &Expr, block: &Block, row: usize) -> Result<Value> {
    match expr {
        Expr::Column(name) => column_value(block, name, row),
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Add(l, r) => numeric_binop("add", eval(l, block, row)?, eval(r, block, row)?, |a, b| a + b),
        Expr::Sub(l, r) => numeric_binop("sub", eval(l, block, row)?, eval(r, block, row)?, |a, b| a - b),
        Expr::Modulo(l, r) => numeric_binop("modulo", eval(l, block, row)?, eval(r, block, row)?, |a, b| {
            if b == 0 {
                0
            } else {
                a.rem_euclid(b)
            }
        }),
        Expr::ToStartOfMonth(inner) => to_start_of_month(eval(inner, block, row)?),
        Expr::ToDate(inner) => to_date(eval(inner, block, row)?),
    }
}

fn column_value(block: &Block, name: &str, row: usize) -> Result<Value> {
    let idx = block
        .schema()
        .index_of(name)
        .map_err(|_| Error::MissingColumn {
            name: name.to_string(),
        })?;
    let array = block.column(idx);
    Ok(try_value_at(array.as_ref() as &dyn Array, row).unwrap_or(Value::Null))
}

fn numeric_binop(op: &'static str, l: Value, r: Value, f: impl Fn(i64, i64) -> i64) -> Result<Value> {
    match (as_i64(&l), as_i64(&r)) {
        (Some(a), Some(b)) => Ok(Value::I64(f(a, b))),
        _ => TypeMismatchSnafu { op, value: l }.fail(),
    }
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::I64(n) => Some(*n),
        Value::U64(n) => i64::try_from(*n).ok(),
        Value::Timestamp(n) => Some(*n),
        _ => None,
    }
}

/// `toStartOfMonth`: truncate a unix-seconds/day-number timestamp down to
/// the first day of its month, expressed as the same unit it was given in
/// (day-number domain — this is the partition-key helper, not a general
/// calendar function).
fn to_start_of_month(v: Value) -> Result<Value> {
    let day_number = as_i64(&v).ok_or_else(|| Error::TypeMismatch {
        op: "toStartOfMonth",
        value: v,
    })?;
    let t = time::Time::from_day_number(day_number as i32);
    let (y, m, _d) = t.year_month_day();
    let first_of_month = time::Time::from_ymd(y, m, 1);
    Ok(Value::I64(first_of_month.day_number() as i64))
}

/// `toDate`: convert a nanosecond timestamp into a day-number.
fn to_date(v: Value) -> Result<Value> {
    match v {
        Value::Timestamp(nanos) => Ok(Value::I64(
            time::Time::from_timestamp_nanos(nanos).day_number() as i64,
        )),
        Value::I64(n) => Ok(Value::I64(n)),
        other => Err(Error::TypeMismatch {
            op: "toDate",
            value: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn block() -> Block {
        let schema = Arc::new(Schema::new(vec![Field::new("k", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![10, 11]))]).unwrap()
    }

    #[test]
    fn column_lookup() {
        assert_eq!(eval(&Expr::column("k"), &block(), 1).unwrap(), Value::I64(11));
    }

    #[test]
    fn modulo_partitions() {
        let expr = Expr::Modulo(Box::new(Expr::column("k")), Box::new(Expr::Literal(Value::I64(5))));
        assert_eq!(eval(&expr, &block(), 0).unwrap(), Value::I64(0));
        assert_eq!(eval(&expr, &block(), 1).unwrap(), Value::I64(1));
    }

    #[test]
    fn missing_column_errors() {
        assert!(matches!(
            eval(&Expr::column("nope"), &block(), 0),
            Err(Error::MissingColumn { .. })
        ));
    }
}
