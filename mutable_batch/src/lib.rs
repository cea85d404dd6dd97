//! The `Block`: an immutable, columnar, equi-length tuple of named typed
//! columns, and [`BlockWithPartition`], a `Block` tagged with the partition
//! tuple all of its rows share.
//!
//! Unlike the row-at-a-time mutable batch builder this crate's name
//! suggests in the rest of the workspace, the write path here only ever
//! receives one whole batch per call (the "single block" non-goal in the
//! writer's contract rules out incremental, multi-call construction), so a
//! `Block` is simply an Arrow `RecordBatch` plus the small set of
//! operations the pipeline needs on top of it.

pub mod value;
pub mod writer;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::compute::{filter_record_batch, take};
use arrow::record_batch::RecordBatch;
use data_types::Value;

pub use writer::Error as WriterError;

/// An immutable, columnar, equi-length tuple of named typed columns. Rows
/// are addressed by index `0..N-1`.
pub type Block = RecordBatch;

/// A [`Block`] plus the partition tuple every one of its rows belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockWithPartition {
    pub block: Block,
    pub partition: Vec<Value>,
}

impl BlockWithPartition {
    pub fn new(block: Block, partition: Vec<Value>) -> Self {
        Self { block, partition }
    }
}

/// The uncompressed byte size of every column's buffers, used both for
/// part-type selection (§4.9) and for space reservation.
pub fn size_of(block: &Block) -> usize {
    block
        .columns()
        .iter()
        .map(|c| c.get_array_memory_size())
        .sum()
}

/// Build a new block containing only `indices` of `block`, in the given
/// order — the shared primitive behind permutation application (sort) and
/// partition scattering.
pub fn take_rows(block: &Block, indices: &arrow::array::UInt64Array) -> writer::Result<Block> {
    let columns: writer::Result<Vec<ArrayRef>> = block
        .columns()
        .iter()
        .map(|col| take(col.as_ref(), indices, None).map_err(writer::Error::from))
        .collect();
    RecordBatch::try_new(block.schema(), columns?).map_err(writer::Error::from)
}

/// Build a new block containing only the rows where `mask` is `true`.
pub fn filter_rows(
    block: &Block,
    mask: &arrow::array::BooleanArray,
) -> writer::Result<Block> {
    filter_record_batch(block, mask).map_err(writer::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, UInt64Array};
    use arrow::datatypes::{DataType, Field, Schema};

    fn block() -> Block {
        let schema = Arc::new(Schema::new(vec![Field::new("k", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![10, 20, 30]))]).unwrap()
    }

    #[test]
    fn take_rows_reorders() {
        let b = block();
        let idx = UInt64Array::from(vec![2, 0, 1]);
        let out = take_rows(&b, &idx).unwrap();
        let col = out
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(col.values(), &[30, 10, 20]);
    }

    #[test]
    fn size_of_is_nonzero_for_nonempty_block() {
        assert!(size_of(&block()) > 0);
    }
}
