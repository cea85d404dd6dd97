//! Extracting a single scalar [`Value`] out of an Arrow array, used by
//! partition-tuple hashing, min/max folding and TTL evaluation.

use arrow::array::{
    Array, BooleanArray, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
    UInt64Array,
};
use arrow::datatypes::DataType;
use data_types::Value;

/// Read the value at `row` out of `array`, mapping Arrow nulls to
/// [`Value::Null`].
///
/// # Panics
///
/// Panics if `array`'s declared type is not one this write path supports —
/// by the time this is called, `Schema::check` has already validated the
/// block against the declared column types, so an unsupported type here
/// indicates a programmer error upstream, matching the "unexpected TTL
/// column type fails with `LogicalError`" contract for callers that want a
/// recoverable error instead (see `ingester::ttl`).
pub fn value_at(array: &dyn Array, row: usize) -> Value {
    try_value_at(array, row).unwrap_or_else(|| {
        panic!(
            "unsupported column type for value extraction: {:?}",
            array.data_type()
        )
    })
}

/// Fallible counterpart to [`value_at`], returning `None` for a column type
/// this model does not know how to turn into a [`Value`].
pub fn try_value_at(array: &dyn Array, row: usize) -> Option<Value> {
    if array.is_null(row) {
        return Some(Value::Null);
    }

    match array.data_type() {
        DataType::Boolean => Some(Value::Bool(
            array.as_any().downcast_ref::<BooleanArray>()?.value(row),
        )),
        DataType::Int64 => Some(Value::I64(
            array.as_any().downcast_ref::<Int64Array>()?.value(row),
        )),
        DataType::UInt64 => Some(Value::U64(
            array.as_any().downcast_ref::<UInt64Array>()?.value(row),
        )),
        DataType::Float64 => Some(Value::F64(
            array
                .as_any()
                .downcast_ref::<Float64Array>()?
                .value(row)
                .into(),
        )),
        DataType::Utf8 => Some(Value::String(
            array
                .as_any()
                .downcast_ref::<StringArray>()?
                .value(row)
                .to_string(),
        )),
        DataType::Timestamp(_, _) => Some(Value::Timestamp(
            array
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()?
                .value(row),
        )),
        _ => None,
    }
}
