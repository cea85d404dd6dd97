//! MinMax Indexer: the `[min, max]` hyper-rectangle over a block's
//! partition-key columns.

use data_types::{MinMaxIndex, Value};
use mutable_batch::value::try_value_at;
use mutable_batch::Block;

/// Fold every row of `block` into a [`MinMaxIndex`] over `columns`. An
/// empty block, or a block missing one of `columns`, simply contributes
/// nothing for that column — callers never see this on the writer's
/// actual path because an empty post-reduction block short-circuits
/// before the indexer runs.
pub fn build(block: &Block, columns: &[String]) -> MinMaxIndex {
    let mut index = MinMaxIndex::new();
    for name in columns {
        let col_idx = match block.schema().index_of(name) {
            Ok(idx) => idx,
            Err(_) => continue,
        };
        let array = block.column(col_idx);
        for row in 0..block.num_rows() {
            if let Some(v) = try_value_at(array.as_ref(), row) {
                if !matches!(v, Value::Null) {
                    index.update(name, v);
                }
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    #[test]
    fn tracks_inclusive_interval_per_column() {
        let schema = Arc::new(Schema::new(vec![Field::new("k", DataType::Int64, false)]));
        let block = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![5, 1, 9, 3]))]).unwrap();
        let index = build(&block, &["k".to_string()]);
        assert_eq!(index.range("k"), Some(&(Value::I64(1), Value::I64(9))));
    }

    #[test]
    fn missing_column_contributes_nothing() {
        let schema = Arc::new(Schema::new(vec![Field::new("k", DataType::Int64, false)]));
        let block = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1]))]).unwrap();
        let index = build(&block, &["nope".to_string()]);
        assert!(index.is_empty());
    }
}
