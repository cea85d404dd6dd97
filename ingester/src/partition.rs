//! Partition Scatterer: hash the partition-key tuple per row, emit a
//! mapping row→partition and a list of distinct partition tuples.

use std::collections::HashMap;

use arrow::array::UInt64Array;
use data_types::hash::hash_partition_tuple;
use data_types::{PartitionKey, Value};
use mutable_batch::{take_rows, Block};
use snafu::{ResultExt, Snafu};

use crate::metrics::WriteMetrics;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "too many parts: discovered {} distinct partitions, exceeding the limit of {}",
        discovered,
        max_parts
    ))]
    TooManyParts { discovered: usize, max_parts: usize },

    #[snafu(display("evaluating partition expression: {}", source))]
    Eval { source: predicate::Error },

    #[snafu(display("scattering rows by partition: {}", source))]
    Scatter { source: mutable_batch::WriterError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// One sub-block together with the partition tuple every one of its rows
/// shares.
pub struct Scattered {
    pub block: Block,
    pub partition: Vec<Value>,
}

/// Split `block` by `partition_key`, failing with `TooManyParts` the moment
/// `max_parts` (if nonzero) is exceeded at discovery time rather than at
/// the end of the scan.
///
/// When the table has no partition key, or when every row lands in the
/// same partition, the original `block` is returned unmodified — the
/// expression-augmented working copy used to compute partition tuples
/// never leaks into the returned sub-blocks.
pub fn split(block: &Block, partition_key: &PartitionKey, max_parts: usize, metrics: &WriteMetrics) -> Result<Vec<Scattered>> {
    if partition_key.is_empty() {
        return Ok(vec![Scattered {
            block: block.clone(),
            partition: Vec::new(),
        }]);
    }

    let num_rows = block.num_rows();
    let mut tuples: Vec<Vec<Value>> = Vec::new();
    let mut hash_to_index: HashMap<u128, usize> = HashMap::new();
    let mut row_partition = vec![0usize; num_rows];

    for row in 0..num_rows {
        let tuple = partition_key
            .exprs()
            .iter()
            .map(|e| predicate::eval(e, block, row))
            .collect::<predicate::Result<Vec<Value>>>()
            .context(EvalSnafu)?;
        let hash = hash_partition_tuple(&tuple);

        let idx = *hash_to_index.entry(hash).or_insert_with(|| {
            let idx = tuples.len();
            tuples.push(tuple);
            idx
        });

        if max_parts > 0 && tuples.len() > max_parts {
            return TooManyPartsSnafu {
                discovered: tuples.len(),
                max_parts,
            }
            .fail();
        }

        row_partition[row] = idx;
    }

    metrics.inc_partitions_discovered();

    if tuples.len() == 1 {
        return Ok(vec![Scattered {
            block: block.clone(),
            partition: tuples.into_iter().next().unwrap(),
        }]);
    }

    let mut out = Vec::with_capacity(tuples.len());
    for (idx, partition) in tuples.into_iter().enumerate() {
        let indices: UInt64Array = row_partition
            .iter()
            .enumerate()
            .filter(|(_, &p)| p == idx)
            .map(|(row, _)| row as u64)
            .collect();
        let sub_block = take_rows(block, &indices).context(ScatterSnafu)?;
        out.push(Scattered {
            block: sub_block,
            partition,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use data_types::Expr;
    use std::sync::Arc;

    fn block() -> Block {
        let schema = Arc::new(Schema::new(vec![Field::new("k", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2, 1, 3, 2]))]).unwrap()
    }

    #[test]
    fn no_partition_key_returns_original_block() {
        let b = block();
        let metrics = WriteMetrics::new();
        let out = split(&b, &PartitionKey::none(), 0, &metrics).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].partition, Vec::<Value>::new());
    }

    #[test]
    fn scatters_by_distinct_values_in_discovery_order() {
        let b = block();
        let key = PartitionKey::new(vec![Expr::column("k")]);
        let metrics = WriteMetrics::new();
        let out = split(&b, &key, 0, &metrics).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].partition, vec![Value::I64(1)]);
        assert_eq!(out[0].block.num_rows(), 2);
        assert_eq!(out[1].partition, vec![Value::I64(2)]);
        assert_eq!(out[2].partition, vec![Value::I64(3)]);
    }

    #[test]
    fn too_many_parts_fails_at_discovery() {
        let b = block();
        let key = PartitionKey::new(vec![Expr::column("k")]);
        let metrics = WriteMetrics::new();
        let err = split(&b, &key, 2, &metrics).unwrap_err();
        assert!(matches!(err, Error::TooManyParts { .. }));
    }
}
