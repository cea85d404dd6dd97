//! Single-Block Reducer: apply one of the seven `MergingMode` algorithms to
//! collapse duplicate rows within one already-sorted block.
//!
//! Equivalence for "merge candidates" is equal values across the full
//! `SortingKey`. Implementation protocol (per contract): construct a
//! merging state, feed the block as a single input run, then invoke the
//! merge step exactly twice — first requesting more data from input 0,
//! second signalling completion. We model that two-step shape directly:
//! [`reduce`] is the "feed + finish" call, and a reducer that can't express
//! its output in those two conceptual steps is a logic error in this
//! module, not a runtime path a caller can hit.

use arrow::array::UInt64Array;
use data_types::{GraphiteAggregate, MergingMode, SortingKey, Value};
use mutable_batch::{take_rows, Block};
use observability_deps::tracing::warn;
use snafu::{ResultExt, Snafu};
use time::Time;

use crate::metrics::WriteMetrics;
use crate::rowops::{add_values, build_block, extract_rows};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("applying sort permutation before reduction: {}", source))]
    Permute { source: mutable_batch::WriterError },

    #[snafu(display("rebuilding reduced block: {}", source))]
    Rebuild { source: crate::rowops::Error },

    #[snafu(display("merging mode references unknown column {}", name))]
    MissingColumn { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reduce `block` (optionally reordered by `permutation` first) per `mode`,
/// grouping on `sorting_key`'s full column list. `now` is used only by
/// `Graphite` (the age of a row relative to "now" selects its retention
/// precision — modeled as a call-time parameter rather than baked into the
/// schema's static `MergingMode` value).
pub fn reduce(
    block: &Block,
    permutation: Option<&UInt64Array>,
    sorting_key: &SortingKey,
    mode: &MergingMode,
    now: Time,
    metrics: &WriteMetrics,
) -> Result<Block> {
    let sorted = match permutation {
        Some(perm) => take_rows(block, perm).context(PermuteSnafu)?,
        None => block.clone(),
    };

    if matches!(mode, MergingMode::Ordinary) {
        return Ok(sorted);
    }

    let schema = sorted.schema();
    let key_indices: Vec<usize> = sorting_key
        .columns()
        .iter()
        .map(|name| schema.index_of(name).map_err(|_| Error::MissingColumn { name: name.clone() }))
        .collect::<Result<_>>()?;

    let rows = extract_rows(&sorted);
    let groups = equivalence_groups(&rows, &key_indices);

    let input_rows = rows.len();
    let mut output_rows: Vec<Vec<Value>> = Vec::with_capacity(groups.len());

    match mode {
        MergingMode::Ordinary => unreachable!("handled above"),
        MergingMode::Replacing { version_column } => {
            let version_idx = column_index(&schema, version_column.as_deref())?;
            for group in &groups {
                output_rows.push(reduce_replacing(&rows, group, version_idx));
            }
        }
        MergingMode::Collapsing { sign_column } => {
            let sign_idx = column_index(&schema, Some(sign_column))?.expect("sign column required");
            for group in &groups {
                output_rows.extend(reduce_collapsing(&rows, group, sign_idx, metrics));
            }
        }
        MergingMode::Summing {
            columns_to_sum,
            partition_columns: _,
        } => {
            let sum_indices: Vec<usize> = columns_to_sum
                .iter()
                .map(|name| schema.index_of(name).map_err(|_| Error::MissingColumn { name: name.clone() }))
                .collect::<Result<_>>()?;
            for group in &groups {
                output_rows.push(reduce_summing(&rows, group, &sum_indices, &key_indices));
            }
        }
        MergingMode::Aggregating => {
            let all_non_key: Vec<usize> = (0..schema.fields().len())
                .filter(|i| !key_indices.contains(i))
                .collect();
            for group in &groups {
                output_rows.push(reduce_summing(&rows, group, &all_non_key, &key_indices));
            }
        }
        MergingMode::VersionedCollapsing {
            sign_column,
            version_column,
        } => {
            let sign_idx = column_index(&schema, Some(sign_column))?.expect("sign column required");
            let version_idx = column_index(&schema, Some(version_column))?.expect("version column required");
            for group in &groups {
                for sub in equivalence_groups_within(&rows, group, &[version_idx]) {
                    output_rows.extend(reduce_collapsing(&rows, &sub, sign_idx, metrics));
                }
            }
        }
        MergingMode::Graphite { rules } => {
            let path_idx = schema.index_of("path").map_err(|_| Error::MissingColumn {
                name: "path".to_string(),
            })?;
            let time_idx = schema.index_of("time").map_err(|_| Error::MissingColumn {
                name: "time".to_string(),
            })?;
            let value_idx = schema.index_of("value").map_err(|_| Error::MissingColumn {
                name: "value".to_string(),
            })?;
            for group in &groups {
                output_rows.extend(reduce_graphite(&rows, group, rules, path_idx, time_idx, value_idx, now));
            }
        }
    }

    if output_rows.len() < input_rows {
        metrics.add_rows_reduced_away((input_rows - output_rows.len()) as u64);
    }

    build_block(schema, &output_rows).context(RebuildSnafu)
}

fn column_index(schema: &arrow::datatypes::Schema, name: Option<&str>) -> Result<Option<usize>> {
    match name {
        None => Ok(None),
        Some(name) => schema
            .index_of(name)
            .map(Some)
            .map_err(|_| Error::MissingColumn { name: name.to_string() }),
    }
}

/// Contiguous runs of rows with equal values across `key_indices`.
fn equivalence_groups(rows: &[Vec<Value>], key_indices: &[usize]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (row_idx, row) in rows.iter().enumerate() {
        let key = |r: &[Value]| -> Vec<&Value> { key_indices.iter().map(|&i| &r[i]).collect() };
        match groups.last_mut() {
            Some(last) if key(&rows[*last.last().unwrap()]) == key(row) => last.push(row_idx),
            _ => groups.push(vec![row_idx]),
        }
    }
    groups
}

/// Like [`equivalence_groups`] but scoped to the row indices in `group`,
/// used by `VersionedCollapsing` to sub-group by version within a
/// sorting-key equivalence class.
fn equivalence_groups_within(rows: &[Vec<Value>], group: &[usize], extra_key_indices: &[usize]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for &row_idx in group {
        let key = |r: &[Value]| -> Vec<&Value> { extra_key_indices.iter().map(|&i| &r[i]).collect() };
        match groups.last_mut() {
            Some(last) if key(&rows[*last.last().unwrap()]) == key(&rows[row_idx]) => last.push(row_idx),
            _ => groups.push(vec![row_idx]),
        }
    }
    groups
}

/// Keep the row with the maximum `version_idx` value, ties and absent
/// version both resolved to "last in input order".
fn reduce_replacing(rows: &[Vec<Value>], group: &[usize], version_idx: Option<usize>) -> Vec<Value> {
    let winner = match version_idx {
        None => *group.last().unwrap(),
        Some(vidx) => *group
            .iter()
            .rev()
            .max_by(|&&a, &&b| rows[a][vidx].cmp(&rows[b][vidx]))
            .unwrap(),
    };
    rows[winner].clone()
}

/// Cancel +1/-1 pairs, keeping the surplus rows (by input order), logging
/// an anomaly when both signs are present and the imbalance exceeds one.
fn reduce_collapsing(rows: &[Vec<Value>], group: &[usize], sign_idx: usize, metrics: &WriteMetrics) -> Vec<Vec<Value>> {
    let (plus, minus): (Vec<usize>, Vec<usize>) = group
        .iter()
        .partition(|&&idx| matches!(rows[idx][sign_idx], Value::I64(1)));

    let surplus = plus.len() as i64 - minus.len() as i64;

    if !plus.is_empty() && !minus.is_empty() && surplus.abs() > 1 {
        metrics.inc_collapsing_anomalies();
        warn!(
            plus = plus.len(),
            minus = minus.len(),
            "collapsing merge: imbalance greater than one within an equivalence class"
        );
    }

    if surplus > 0 {
        plus[plus.len() - surplus as usize..].iter().map(|&i| rows[i].clone()).collect()
    } else if surplus < 0 {
        let keep = (-surplus) as usize;
        minus[minus.len() - keep..].iter().map(|&i| rows[i].clone()).collect()
    } else {
        Vec::new()
    }
}

/// One row per class: `sum_indices` columns summed across the class, every
/// other non-key column takes the first row's value.
fn reduce_summing(rows: &[Vec<Value>], group: &[usize], sum_indices: &[usize], _key_indices: &[usize]) -> Vec<Value> {
    let mut out = rows[group[0]].clone();
    for &col in sum_indices {
        let mut acc = rows[group[0]][col].clone();
        for &row_idx in &group[1..] {
            acc = add_values(&acc, &rows[row_idx][col]);
        }
        out[col] = acc;
    }
    out
}

/// Bucket a path's rows by the retention precision selected for their age
/// relative to `now`, summarising each bucket's value column with the
/// rule's aggregate function.
#[allow(clippy::too_many_arguments)]
fn reduce_graphite(
    rows: &[Vec<Value>],
    group: &[usize],
    rules: &[data_types::GraphiteRule],
    path_idx: usize,
    time_idx: usize,
    value_idx: usize,
    now: Time,
) -> Vec<Vec<Value>> {
    let path = match &rows[group[0]][path_idx] {
        Value::String(s) => s.clone(),
        _ => String::new(),
    };
    let rule = rules
        .iter()
        .find(|r| r.pattern == "*" || r.pattern == path)
        .or_else(|| rules.first());
    let rule = match rule {
        Some(r) => r,
        None => return group.iter().map(|&i| rows[i].clone()).collect(),
    };

    let precision_for = |row_time_secs: i64| -> i64 {
        let age = now.timestamp() - row_time_secs;
        rule.retentions
            .iter()
            .filter(|r| age >= r.age_threshold_secs)
            .map(|r| r.precision_secs)
            .max()
            .unwrap_or(1)
    };

    let mut buckets: Vec<(i64, Vec<usize>)> = Vec::new();
    for &row_idx in group {
        let row_time_secs = match &rows[row_idx][time_idx] {
            Value::Timestamp(nanos) => Time::from_timestamp_nanos(*nanos).timestamp(),
            Value::I64(secs) => *secs,
            _ => 0,
        };
        let precision = precision_for(row_time_secs);
        let bucket_start = (row_time_secs / precision) * precision;
        match buckets.iter_mut().find(|(b, _)| *b == bucket_start) {
            Some((_, members)) => members.push(row_idx),
            None => buckets.push((bucket_start, vec![row_idx])),
        }
    }

    buckets
        .into_iter()
        .map(|(bucket_start, members)| {
            let mut out = rows[members[0]].clone();
            out[time_idx] = Value::Timestamp(bucket_start * 1_000_000_000);
            out[value_idx] = apply_graphite_aggregate(rule.aggregate, rows, &members, value_idx);
            out
        })
        .collect()
}

fn apply_graphite_aggregate(aggregate: GraphiteAggregate, rows: &[Vec<Value>], members: &[usize], value_idx: usize) -> Value {
    let values: Vec<f64> = members
        .iter()
        .filter_map(|&i| match &rows[i][value_idx] {
            Value::F64(v) => Some(v.into_inner()),
            Value::I64(v) => Some(*v as f64),
            _ => None,
        })
        .collect();
    if values.is_empty() {
        return rows[members[0]][value_idx].clone();
    }
    let result = match aggregate {
        GraphiteAggregate::Sum => values.iter().sum(),
        GraphiteAggregate::Max => values.iter().cloned().fold(f64::MIN, f64::max),
        GraphiteAggregate::Min => values.iter().cloned().fold(f64::MAX, f64::min),
        GraphiteAggregate::Average => values.iter().sum::<f64>() / values.len() as f64,
        GraphiteAggregate::Last => *values.last().unwrap(),
    };
    Value::F64(result.into())
}
