//! Sort Planner: decide whether a block is already sorted by the table's
//! `SortingKey`, else compute a stable permutation over it.

use arrow::array::UInt64Array;
use data_types::{SortingKey, Value};
use mutable_batch::value::try_value_at;
use mutable_batch::Block;
use snafu::Snafu;

use crate::metrics::WriteMetrics;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("sorting key references unknown column {}", name))]
    MissingColumn { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// `Some(permutation)` applies to yield non-decreasing order over
/// `sorting_key`'s columns; `None` means the block is already in that
/// order (including the trivial case of an empty `SortingKey`).
pub fn plan(block: &Block, sorting_key: &SortingKey, metrics: &WriteMetrics) -> Result<Option<UInt64Array>> {
    if sorting_key.is_empty() {
        return Ok(None);
    }

    let column_indices: Vec<usize> = sorting_key
        .columns()
        .iter()
        .map(|name| {
            block
                .schema()
                .index_of(name)
                .map_err(|_| Error::MissingColumn { name: name.clone() })
        })
        .collect::<Result<_>>()?;

    let num_rows = block.num_rows();
    let key_tuples: Vec<Vec<Value>> = (0..num_rows)
        .map(|row| {
            column_indices
                .iter()
                .map(|&col| try_value_at(block.column(col).as_ref(), row).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    if key_tuples.windows(2).all(|pair| pair[0] <= pair[1]) {
        metrics.inc_already_sorted();
        return Ok(None);
    }

    let mut indices: Vec<u64> = (0..num_rows as u64).collect();
    // `sort_by` is a stable sort: rows with equal keys retain input order.
    indices.sort_by(|&a, &b| key_tuples[a as usize].cmp(&key_tuples[b as usize]));
    metrics.add_rows_sorted(num_rows as u64);

    Ok(Some(UInt64Array::from(indices)))
}
