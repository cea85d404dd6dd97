//! TTL Accumulator: evaluate each declared TTL expression against the
//! (reduced) block and fold the results into per-category summaries.

use data_types::{PartTtlInfos, TtlEntry, TtlInfo, Value};
use mutable_batch::Block;
use snafu::{ResultExt, Snafu};
use time::Time;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("evaluating TTL expression: {}", source))]
    Eval { source: predicate::Error },

    #[snafu(display(
        "TTL expression for column {:?} produced a non-temporal value: {:?}",
        column,
        value
    ))]
    NonTemporal { column: Option<String>, value: Value },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fold every declared TTL entry's evaluated values over `block` into a
/// [`PartTtlInfos`].
pub fn accumulate(block: &Block, entries: &[TtlEntry]) -> Result<PartTtlInfos> {
    let mut infos = PartTtlInfos::default();
    for entry in entries {
        let folded = fold_entry(block, entry)?;
        infos.record(entry, folded);
    }
    Ok(infos)
}

fn fold_entry(block: &Block, entry: &TtlEntry) -> Result<TtlInfo> {
    let mut info = TtlInfo::default();
    for row in 0..block.num_rows() {
        let value = predicate::eval(&entry.expression, block, row).context(EvalSnafu)?;
        let time = temporal_value(&entry.column, value)?;
        info.update(time);
    }
    Ok(info)
}

/// Interpret an evaluated TTL expression result as a [`Time`], treating
/// in-range integers as a day-number (compact date) and out-of-range ones
/// as unix-seconds — the process-wide calendar table conversion named in
/// the TTL accumulator's contract.
fn temporal_value(column: &Option<String>, value: Value) -> Result<Time> {
    match value {
        Value::Timestamp(nanos) => Ok(Time::from_timestamp_nanos(nanos)),
        Value::I64(n) => Ok(day_number_or_seconds(n)),
        Value::U64(n) => Ok(day_number_or_seconds(n as i64)),
        other => NonTemporalSnafu {
            column: column.clone(),
            value: other,
        }
        .fail(),
    }
}

/// A day-number fits comfortably under ~120,000 (year ~2300); anything
/// larger is treated as unix-seconds directly.
const MAX_PLAUSIBLE_DAY_NUMBER: i64 = 120_000;

fn day_number_or_seconds(n: i64) -> Time {
    if n.unsigned_abs() <= MAX_PLAUSIBLE_DAY_NUMBER as u64 {
        Time::from_day_number(n as i32)
    } else {
        Time::from_timestamp(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::TimestampNanosecondArray;
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use data_types::{Expr, TtlCategory};
    use std::sync::Arc;

    fn block() -> Block {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "t",
            DataType::Timestamp(TimeUnit::Nanosecond, None),
            false,
        )]));
        RecordBatch::try_new(
            schema,
            vec![Arc::new(TimestampNanosecondArray::from(vec![1_000_000_000, 2_000_000_000]))],
        )
        .unwrap()
    }

    #[test]
    fn folds_timestamp_column_into_rows_category() {
        let entry = TtlEntry::new(TtlCategory::Rows, Expr::column("t"));
        let infos = accumulate(&block(), &[entry]).unwrap();
        let rows = infos.rows.unwrap();
        assert_eq!(rows.min, Some(Time::from_timestamp(1)));
        assert_eq!(rows.max, Some(Time::from_timestamp(2)));
        assert!(infos.part_wide.is_some());
    }

    #[test]
    fn move_category_does_not_touch_part_wide() {
        let entry = TtlEntry::new(TtlCategory::Move, Expr::column("t"));
        let infos = accumulate(&block(), &[entry]).unwrap();
        assert!(infos.part_wide.is_none());
        assert_eq!(infos.move_ttl.len(), 1);
    }
}
