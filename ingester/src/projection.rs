//! Projection Writer: recursively apply the sort/reduce pipeline (sans
//! partitioning — a projection never re-partitions) to a derived block with
//! its own child schema, writing the result into a subdirectory of the
//! parent part's temp directory.

use std::path::{Path, PathBuf};

use data_types::{MergingMode, PartName, Value};
use iox_catalog::interface::{Projection, ProjectionType, WriterSettings};
use mutable_batch::Block;
use observability_deps::tracing::debug;
use parquet_file::writer::{SerializerFactory, Stream};
use predicate::codec::CompressionCodec;
use snafu::{ResultExt, Snafu};
use time::Time;

use crate::metrics::WriteMetrics;
use crate::rowops::build_block;
use crate::{reduce, sort};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("evaluating projection query: {}", source))]
    Eval { source: predicate::Error },

    #[snafu(display("rebuilding projection block: {}", source))]
    Rebuild { source: crate::rowops::Error },

    #[snafu(display("sort-planning projection: {}", source))]
    Sort { source: sort::Error },

    #[snafu(display("reducing projection: {}", source))]
    Reduce { source: reduce::Error },

    #[snafu(display("opening projection serializer: {}", source))]
    Open { source: parquet_file::writer::Error },

    #[snafu(display("writing projection rows: {}", source))]
    Write { source: parquet_file::writer::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A subdirectory name for a projection part: `<name>.proj` when final, or
/// `<name>.tmp_proj` during bulk re-materialisation
/// (`writeTempProjectionPart`'s intermediate form).
fn subdir_name(proj_name: &str, is_temp: bool) -> String {
    if is_temp {
        format!("{proj_name}.tmp_proj")
    } else {
        format!("{proj_name}.proj")
    }
}

/// Write one projection's derived part, appending its stream to `streams`
/// so it finalizes alongside the parent. Returns `None` if the projection's
/// calculated block is empty (skipped per contract).
#[allow(clippy::too_many_arguments)]
pub fn write_one(
    parent_dir: &Path,
    reduced_main_block: &Block,
    projection: &Projection,
    codec: CompressionCodec,
    settings: &WriterSettings,
    factory: &dyn SerializerFactory,
    streams: &mut Vec<Stream>,
    metrics: &WriteMetrics,
    now: Time,
    block_counter: Option<u64>,
) -> Result<Option<PathBuf>> {
    let rows = calculate(reduced_main_block, projection).context(EvalSnafu)?;
    if rows.is_empty() {
        return Ok(None);
    }

    let child_arrow_schema = projection.child_schema.columns.as_arrow();
    let block = build_block(child_arrow_schema, &rows).context(RebuildSnafu)?;

    let merging_mode = match projection.projection_type {
        ProjectionType::Aggregate => MergingMode::Aggregating,
        ProjectionType::Normal => projection.child_schema.merging_mode.clone(),
    };

    let permutation = sort::plan(&block, &projection.child_schema.sorting_key, metrics).context(SortSnafu)?;
    let reduced = reduce::reduce(
        &block,
        permutation.as_ref(),
        &projection.child_schema.sorting_key,
        &merging_mode,
        now,
        metrics,
    )
    .context(ReduceSnafu)?;

    let is_temp = block_counter.is_some();
    let mut dir_name = subdir_name(&projection.name, is_temp);
    if let Some(counter) = block_counter {
        dir_name = format!("{dir_name}.{counter}");
    }
    let dir = parent_dir.join(&dir_name);

    debug!(projection = %projection.name, dir = %dir.display(), "writing projection part");

    let mut stream = factory
        .open(&dir, &projection.child_schema.columns, &projection.child_schema.skip_indices, codec, settings, None)
        .context(OpenSnafu)?;
    // Projection parts are hard-coded to partition id "all", block range 0_0_0.
    let _name = PartName::v1("all", 0).format();
    stream.set_partition(vec![Value::String("all".to_string())]);
    stream.write_with_permutation(&reduced, None).context(WriteSnafu)?;

    streams.push(stream);
    metrics.inc_projections_written();

    Ok(Some(dir))
}

fn calculate(block: &Block, projection: &Projection) -> predicate::Result<Vec<Vec<Value>>> {
    (0..block.num_rows())
        .map(|row| {
            projection
                .query
                .iter()
                .map(|expr| predicate::eval(expr, block, row))
                .collect::<predicate::Result<Vec<Value>>>()
        })
        .collect()
}
