//! Row-at-a-time value extraction and reconstruction shared by the
//! Single-Block Reducer and the Projection Writer. Both need to combine
//! rows across an equivalence class (sum, pick-max, cancel) rather than
//! just reorder them, so they work a level below the zero-copy
//! `take`/`filter` primitives in `mutable_batch`.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    TimestampNanosecondBuilder, UInt64Builder,
};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use data_types::Value;
use mutable_batch::value::try_value_at;
use mutable_batch::Block;
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("arrow error: {}", source))]
    Arrow { source: arrow::error::ArrowError },

    #[snafu(display("column {} has a type with no Value representation", name))]
    UnsupportedColumn { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<arrow::error::ArrowError> for Error {
    fn from(source: arrow::error::ArrowError) -> Self {
        Error::Arrow { source }
    }
}

/// Extract every row of `block` as a `Vec<Value>` in column order.
pub fn extract_rows(block: &Block) -> Vec<Vec<Value>> {
    let num_cols = block.num_columns();
    (0..block.num_rows())
        .map(|row| {
            (0..num_cols)
                .map(|col| try_value_at(block.column(col).as_ref(), row).unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}

/// Rebuild a [`Block`] from row-major `Value` data, using `schema` to pick
/// the concrete Arrow type for each column.
pub fn build_block(schema: SchemaRef, rows: &[Vec<Value>]) -> Result<Block> {
    let num_cols = schema.fields().len();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(num_cols);
    for (col_idx, field) in schema.fields().iter().enumerate() {
        let values: Vec<&Value> = rows.iter().map(|r| &r[col_idx]).collect();
        columns.push(build_column(field.data_type(), &values)?);
    }
    RecordBatch::try_new(schema, columns).map_err(Error::from)
}

fn build_column(data_type: &DataType, values: &[&Value]) -> Result<ArrayRef> {
    Ok(match data_type {
        DataType::Boolean => {
            let mut b = BooleanBuilder::new(values.len());
            for v in values {
                match v {
                    Value::Bool(x) => b.append_value(*x)?,
                    _ => b.append_null()?,
                }
            }
            Arc::new(b.finish())
        }
        DataType::Int64 => {
            let mut b = Int64Builder::new(values.len());
            for v in values {
                match v {
                    Value::I64(x) => b.append_value(*x)?,
                    _ => b.append_null()?,
                }
            }
            Arc::new(b.finish())
        }
        DataType::UInt64 => {
            let mut b = UInt64Builder::new(values.len());
            for v in values {
                match v {
                    Value::U64(x) => b.append_value(*x)?,
                    _ => b.append_null()?,
                }
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::new(values.len());
            for v in values {
                match v {
                    Value::F64(x) => b.append_value(x.into_inner())?,
                    _ => b.append_null()?,
                }
            }
            Arc::new(b.finish())
        }
        DataType::Utf8 => {
            let mut b = StringBuilder::new(values.len());
            for v in values {
                match v {
                    Value::String(x) => b.append_value(x)?,
                    _ => b.append_null()?,
                }
            }
            Arc::new(b.finish())
        }
        DataType::Timestamp(_, _) => {
            let mut b = TimestampNanosecondBuilder::new(values.len());
            for v in values {
                match v {
                    Value::Timestamp(x) => b.append_value(*x)?,
                    _ => b.append_null()?,
                }
            }
            Arc::new(b.finish())
        }
        other => {
            return Err(Error::UnsupportedColumn {
                name: format!("{:?}", other),
            })
        }
    })
}

/// Numeric accumulation helper shared by `Summing`/`Aggregating`: add two
/// `Value`s of matching numeric type, leaving non-numeric values
/// untouched (first operand wins).
pub fn add_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::I64(x), Value::I64(y)) => Value::I64(x + y),
        (Value::U64(x), Value::U64(y)) => Value::U64(x + y),
        (Value::F64(x), Value::F64(y)) => Value::F64(*x + *y),
        _ => a.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{Field, Schema};

    #[test]
    fn roundtrips_through_extract_and_rebuild() {
        let schema = Arc::new(Schema::new(vec![Field::new("k", DataType::Int64, true)]));
        let block = RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![1, 2, 3]))]).unwrap();
        let rows = extract_rows(&block);
        let rebuilt = build_block(schema, &rows).unwrap();
        let col = rebuilt.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(col.values(), &[1, 2, 3]);
    }
}
