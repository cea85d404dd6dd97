//! Write Orchestrator: the state machine tying every other component
//! together for one `writeTempPart` call, plus the top-level `write` entry
//! point that scatters an input block by partition first.
//!
//! ```text
//! Start → Prepare (pick columns, deduce object-column concrete types,
//!                  allocate temp_index, name)
//!       → ReserveDir (create the temp directory)
//!       → EvaluateKeys (skip-index expressions)
//!       → Sort → Reduce → (if empty: Return empty TemporaryPart)
//!       → TTLs → MinMax → ChooseCodec
//!       → OpenSerializer → WritePermuted → Projections*
//!       → FinalizeAsync → Return TemporaryPart
//! ```
//!
//! States are in-memory only; there is no persisted state machine. A
//! failure after `ReserveDir` leaves the temp directory for the janitor —
//! this module never deletes a partially-written directory synchronously.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use data_types::{MinMaxIndex, PartName, PartTtlInfos, PartType, TempIndexAllocator, Value};
use iox_catalog::interface::SchemaSnapshot;
use iox_catalog::WriterSettings;
use mutable_batch::Block;
use object_store::{Reservation, StoragePolicy};
use observability_deps::tracing::{debug, info};
use parquet_file::writer::{SerializerFactory, Stream};
use snafu::Snafu;
use time::{Time, TimeProvider};
use uuid::Uuid;

use crate::metrics::WriteMetrics;
use crate::{minmax, partition, projection, reduce, reserve, sort, ttl};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("too many parts: {}", source))]
    TooManyParts { source: partition::Error },

    #[snafu(display("logical error: {}", message))]
    LogicalError { message: String },

    #[snafu(display("reservation failed: {}", source))]
    ReservationFailure { source: reserve::Error },

    #[snafu(display("io error: {}", source))]
    IoError { source: parquet_file::writer::Error },

    #[snafu(display("schema mismatch: {}", source))]
    SchemaMismatch { source: schema::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<partition::Error> for Error {
    fn from(source: partition::Error) -> Self {
        if matches!(&source, partition::Error::TooManyParts { .. }) {
            Error::TooManyParts { source }
        } else {
            Error::LogicalError {
                message: source.to_string(),
            }
        }
    }
}

impl From<sort::Error> for Error {
    fn from(source: sort::Error) -> Self {
        Error::LogicalError {
            message: source.to_string(),
        }
    }
}

impl From<reduce::Error> for Error {
    fn from(source: reduce::Error) -> Self {
        Error::LogicalError {
            message: source.to_string(),
        }
    }
}

impl From<ttl::Error> for Error {
    fn from(source: ttl::Error) -> Self {
        Error::LogicalError {
            message: source.to_string(),
        }
    }
}

impl From<data_types::part_name::Error> for Error {
    fn from(source: data_types::part_name::Error) -> Self {
        Error::LogicalError {
            message: source.to_string(),
        }
    }
}

impl From<projection::Error> for Error {
    fn from(source: projection::Error) -> Self {
        Error::LogicalError {
            message: source.to_string(),
        }
    }
}

impl From<reserve::Error> for Error {
    fn from(source: reserve::Error) -> Self {
        Error::ReservationFailure { source }
    }
}

impl From<parquet_file::writer::Error> for Error {
    fn from(source: parquet_file::writer::Error) -> Self {
        Error::IoError { source }
    }
}

impl From<schema::Error> for Error {
    fn from(source: schema::Error) -> Self {
        Error::SchemaMismatch { source }
    }
}

/// Everything the write path recorded about one written part, independent
/// of the on-disk bytes themselves.
#[derive(Debug, Clone)]
pub struct PartDescriptor {
    pub name: String,
    pub partition: Vec<Value>,
    pub minmax: MinMaxIndex,
    pub ttl: PartTtlInfos,
    pub row_count: u64,
    pub part_type: PartType,
    pub uuid: Option<Uuid>,
}

/// The handle returned by `write_temp_part`/`write`: a recoverable temp
/// directory exclusively owned by this writer until `finalize()` is
/// called, plus every `Stream` (main part + any projections) that must be
/// closed before the part is durable.
///
/// `descriptor` is `None` when reduction produced zero rows: the contract
/// requires returning an empty part rather than failing, and no directory
/// or files are created for it.
pub struct TemporaryPart {
    dir: Option<PathBuf>,
    descriptor: Option<PartDescriptor>,
    streams: Vec<Stream>,
}

impl TemporaryPart {
    pub fn is_empty(&self) -> bool {
        self.descriptor.is_none()
    }

    pub fn descriptor(&self) -> Option<&PartDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Await every stream's finalizer. Degenerates to a no-op for an empty
    /// part. Models `finalizePartAsync`'s handle-aggregation contract — in
    /// this single-process implementation the handles are plain
    /// `tokio::task::JoinHandle`s, but the await-all shape is identical to
    /// a multi-worker finalizer pool.
    pub async fn finalize(self) -> Result<()> {
        for stream in self.streams {
            stream.finalize_async().await_done().await?;
        }
        Ok(())
    }
}

/// Scatter `block` by the schema's partition key and run the per-partition
/// write orchestrator on each resulting sub-block.
#[allow(clippy::too_many_arguments)]
pub fn write(
    root_dir: &Path,
    block: &Block,
    schema_snapshot: &SchemaSnapshot,
    settings: &WriterSettings,
    policy: &StoragePolicy,
    temp_index_allocator: &TempIndexAllocator,
    factory: &dyn SerializerFactory,
    time_provider: &dyn TimeProvider,
    metrics: &Arc<WriteMetrics>,
) -> Result<Vec<TemporaryPart>> {
    schema_snapshot.columns.check(block)?;

    let scattered = partition::split(block, &schema_snapshot.partition_key, settings.max_parts, metrics)?;

    scattered
        .into_iter()
        .map(|s| {
            write_temp_part(
                root_dir,
                &s.block,
                s.partition,
                schema_snapshot,
                settings,
                policy,
                temp_index_allocator,
                factory,
                time_provider,
                metrics,
            )
        })
        .collect()
}

/// Run the write orchestrator's state machine for one already-scattered
/// `(sub_block, partition)` pair.
#[allow(clippy::too_many_arguments)]
pub fn write_temp_part(
    root_dir: &Path,
    block: &Block,
    partition_tuple: Vec<Value>,
    schema_snapshot: &SchemaSnapshot,
    settings: &WriterSettings,
    policy: &StoragePolicy,
    temp_index_allocator: &TempIndexAllocator,
    factory: &dyn SerializerFactory,
    time_provider: &dyn TimeProvider,
    metrics: &Arc<WriteMetrics>,
) -> Result<TemporaryPart> {
    // --- Prepare ---
    let columns = schema_snapshot.columns.with_concrete_object_types(block);
    let temp_index = temp_index_allocator.next();
    let now = time_provider.now();

    // --- EvaluateKeys (skip-index expressions validated eagerly; their
    // on-disk index structures are the serializer's concern) ---
    for skip_index in &schema_snapshot.skip_indices {
        if block.num_rows() > 0 {
            predicate::eval(&skip_index.expression, block, 0).map_err(|e| Error::LogicalError {
                message: format!("skip index {}: {}", skip_index.name, e),
            })?;
        }
    }

    // --- Sort ---
    let permutation = sort::plan(block, &schema_snapshot.sorting_key, metrics)?;

    // --- Reduce ---
    // The reducer only runs when `optimize_on_insert` is set (spec §4.3);
    // otherwise every mode degenerates to `Ordinary` and only the sort
    // permutation is applied, so the written part carries every input row.
    let merging_mode = if settings.optimize_on_insert {
        schema_snapshot.merging_mode.clone()
    } else {
        data_types::MergingMode::Ordinary
    };
    let reduced = reduce::reduce(
        block,
        permutation.as_ref(),
        &schema_snapshot.sorting_key,
        &merging_mode,
        now,
        metrics,
    )?;

    if reduced.num_rows() == 0 {
        return Ok(TemporaryPart {
            dir: None,
            descriptor: None,
            streams: Vec::new(),
        });
    }

    // --- TTLs ---
    let ttl_infos = ttl::accumulate(&reduced, &schema_snapshot.ttl_entries)?;

    // --- MinMax ---
    // Cover every column a partition expression actually reads from (not
    // just a bare top-level `Expr::Column`), so a computed partition key
    // such as `k % 2` still produces a MinMax index over `k`.
    let mut partition_columns: Vec<String> = Vec::new();
    for expr in schema_snapshot.partition_key.exprs() {
        for name in expr.referenced_columns() {
            if !partition_columns.contains(&name) {
                partition_columns.push(name);
            }
        }
    }
    let minmax_index = minmax::build(&reduced, &partition_columns);

    // --- Naming ---
    let name = PartName::v1(partition_name(&partition_tuple), temp_index).format();

    // --- ReserveDir ---
    let expected_bytes = mutable_batch::size_of(&reduced) as u64;
    let move_ttl = ttl_infos
        .move_ttl
        .first()
        .cloned()
        .unwrap_or_default();
    let reservation: Reservation = reserve::reserve(policy, expected_bytes, &move_ttl, now)?;

    let dir = root_dir.join(format!("tmp_insert_{name}"));
    std::fs::create_dir_all(&dir).map_err(|e| Error::IoError {
        source: parquet_file::writer::Error::Io {
            path: dir.clone(),
            source: e,
        },
    })?;
    info!(part = %name, volume = reservation.volume(), bytes = expected_bytes, "reserved space for part");

    // --- ChooseCodec ---
    let codec = predicate::codec::choose_compression_codec(
        expected_bytes as usize,
        settings.ratio_of_defaults_for_sparse_serialization,
    );

    // --- OpenSerializer / WritePermuted ---
    let mut main_stream = factory.open(&dir, &columns, &schema_snapshot.skip_indices, codec, settings, None)?;
    main_stream.set_partition(partition_tuple.clone());
    main_stream.write_with_permutation(&reduced, None)?;

    let row_count = main_stream.rows_written();
    let mut streams = vec![main_stream];

    // --- Projections ---
    for proj in &schema_snapshot.projections {
        projection::write_one(&dir, &reduced, proj, codec, settings, factory, &mut streams, metrics, now, None)?;
    }

    // --- FinalizeAsync prepared by the caller via TemporaryPart::finalize ---
    let part_type = settings.part_type_thresholds.choose(expected_bytes, row_count);

    let uuid = settings.assign_part_uuids.then(Uuid::new_v4);

    debug!(part = %name, rows = row_count, "write_temp_part prepared, pending finalize()");

    Ok(TemporaryPart {
        dir: Some(dir),
        descriptor: Some(PartDescriptor {
            name,
            partition: partition_tuple,
            minmax: minmax_index,
            ttl: ttl_infos,
            row_count,
            part_type,
            uuid,
        }),
        streams,
    })
}

fn partition_name(tuple: &[Value]) -> String {
    if tuple.is_empty() {
        return "all".to_string();
    }
    tuple
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
    use arrow::record_batch::RecordBatch;
    use data_types::{ColumnSchema, ColumnType, Expr, MergingMode, PartitionKey, SortingKey};
    use object_store::local::LocalVolume;
    use parquet_file::writer::ParquetSerializer;
    use schema::Schema as TableSchema;
    use time::MockProvider;

    fn schema_snapshot(partition_key: PartitionKey, sorting_key: SortingKey, mode: MergingMode) -> SchemaSnapshot {
        let columns = TableSchema::new(vec![
            ColumnSchema::new("k", ColumnType::I64),
            ColumnSchema::new("v", ColumnType::String),
        ]);
        SchemaSnapshot::new(columns, partition_key, sorting_key, mode)
    }

    fn block(keys: Vec<i64>, values: Vec<&str>) -> Block {
        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("k", DataType::Int64, false),
            Field::new("v", DataType::Utf8, false),
        ]));
        RecordBatch::try_new(
            arrow_schema,
            vec![Arc::new(Int64Array::from(keys)), Arc::new(StringArray::from(values))],
        )
        .unwrap()
    }

    fn policy() -> StoragePolicy {
        StoragePolicy::new(vec![Box::new(LocalVolume::new("v0", "/tmp").with_available_bytes(u64::MAX))])
    }

    #[test]
    fn scenario_1_unpartitioned_already_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = schema_snapshot(PartitionKey::none(), SortingKey::new(vec!["k".to_string()]), MergingMode::Ordinary);
        let settings = WriterSettings::default();
        let b = block(vec![1, 2, 3], vec!["a", "b", "c"]);
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 1);
        assert!(parts[0].descriptor().unwrap().partition.is_empty());
        assert_eq!(
            metrics.already_sorted.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn scenario_2_partition_by_modulo_two_groups() {
        let dir = tempfile::tempdir().unwrap();
        let modulo = Expr::Modulo(Box::new(Expr::column("k")), Box::new(Expr::Literal(Value::I64(2))));
        let snapshot = schema_snapshot(
            PartitionKey::new(vec![modulo]),
            SortingKey::new(vec!["k".to_string()]),
            MergingMode::Ordinary,
        );
        let settings = WriterSettings::default();
        let b = block(vec![0, 1, 2, 3], vec!["a", "b", "c", "d"]);
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let mut parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 2);
        parts.sort_by_key(|p| p.descriptor().unwrap().partition.clone());
        assert_eq!(parts[0].descriptor().unwrap().partition, vec![Value::I64(0)]);
        assert_eq!(parts[0].descriptor().unwrap().row_count, 2);
        assert_eq!(parts[1].descriptor().unwrap().partition, vec![Value::I64(1)]);
        assert_eq!(parts[1].descriptor().unwrap().row_count, 2);
    }

    #[test]
    fn scenario_5_too_many_partitions_creates_no_directory() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = schema_snapshot(
            PartitionKey::new(vec![Expr::column("k")]),
            SortingKey::new(vec!["k".to_string()]),
            MergingMode::Ordinary,
        );
        let mut settings = WriterSettings::default();
        settings.max_parts = 3;
        let b = block(vec![0, 1, 2, 3], vec!["a", "b", "c", "d"]);
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let err = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap_err();

        assert!(matches!(err, Error::TooManyParts { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_reduction_returns_empty_part_and_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let columns = TableSchema::new(vec![
            ColumnSchema::new("grp", ColumnType::I64),
            ColumnSchema::new("sign", ColumnType::I64),
        ]);
        let snapshot = SchemaSnapshot::new(
            columns,
            PartitionKey::none(),
            SortingKey::new(vec!["grp".to_string()]),
            MergingMode::Collapsing {
                sign_column: "sign".to_string(),
            },
        );
        // both rows share the same "grp" equivalence class; sign +1/-1 cancels entirely
        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("grp", DataType::Int64, false),
            Field::new("sign", DataType::Int64, false),
        ]));
        let b = RecordBatch::try_new(
            arrow_schema,
            vec![Arc::new(Int64Array::from(vec![0, 0])), Arc::new(Int64Array::from(vec![1, -1]))],
        )
        .unwrap();
        let mut settings = WriterSettings::default();
        settings.optimize_on_insert = true;
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn optimize_on_insert_false_skips_reduction() {
        // Same input as `empty_reduction_returns_empty_part_and_creates_nothing`,
        // but with the default (`optimize_on_insert: false`) settings: the
        // +1/-1 pair must NOT cancel, matching spec.md §4.3/§8's idempotence
        // property that a disabled `optimize_on_insert` leaves every row.
        let dir = tempfile::tempdir().unwrap();
        let columns = TableSchema::new(vec![
            ColumnSchema::new("grp", ColumnType::I64),
            ColumnSchema::new("sign", ColumnType::I64),
        ]);
        let snapshot = SchemaSnapshot::new(
            columns,
            PartitionKey::none(),
            SortingKey::new(vec!["grp".to_string()]),
            MergingMode::Collapsing {
                sign_column: "sign".to_string(),
            },
        );
        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("grp", DataType::Int64, false),
            Field::new("sign", DataType::Int64, false),
        ]));
        let b = RecordBatch::try_new(
            arrow_schema,
            vec![Arc::new(Int64Array::from(vec![0, 0])), Arc::new(Int64Array::from(vec![1, -1]))],
        )
        .unwrap();
        let settings = WriterSettings::default();
        assert!(!settings.optimize_on_insert);
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].descriptor().unwrap().row_count, 2);
    }

    #[test]
    fn scenario_3_replacing_keeps_max_version() {
        let dir = tempfile::tempdir().unwrap();
        let columns = TableSchema::new(vec![
            ColumnSchema::new("k", ColumnType::I64),
            ColumnSchema::new("version", ColumnType::I64),
        ]);
        let snapshot = SchemaSnapshot::new(
            columns,
            PartitionKey::none(),
            SortingKey::new(vec!["k".to_string()]),
            MergingMode::Replacing {
                version_column: Some("version".to_string()),
            },
        );
        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("k", DataType::Int64, false),
            Field::new("version", DataType::Int64, false),
        ]));
        let b = RecordBatch::try_new(
            arrow_schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 1, 2])),
                Arc::new(Int64Array::from(vec![10, 20, 5])),
            ],
        )
        .unwrap();
        let mut settings = WriterSettings::default();
        settings.optimize_on_insert = true;
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].descriptor().unwrap().row_count, 2);
    }

    #[test]
    fn scenario_4_collapsing_imbalance_keeps_surplus() {
        // spec.md §8 scenario 4's literal input: (1,+1),(1,+1),(1,-1) is an
        // imbalance of exactly one within the class. Per DESIGN.md's
        // anomaly-threshold resolution the logged/metric anomaly only fires
        // above that (matching §4.3's "imbalance > 1" and ClickHouse), so
        // this case keeps the surplus row but does not bump the counter —
        // see `collapsing_anomaly_above_threshold_is_counted` below for that.
        let dir = tempfile::tempdir().unwrap();
        let columns = TableSchema::new(vec![
            ColumnSchema::new("k", ColumnType::I64),
            ColumnSchema::new("sign", ColumnType::I64),
        ]);
        let snapshot = SchemaSnapshot::new(
            columns,
            PartitionKey::none(),
            SortingKey::new(vec!["k".to_string()]),
            MergingMode::Collapsing {
                sign_column: "sign".to_string(),
            },
        );
        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("k", DataType::Int64, false),
            Field::new("sign", DataType::Int64, false),
        ]));
        let b = RecordBatch::try_new(
            arrow_schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 1, 1])),
                Arc::new(Int64Array::from(vec![1, 1, -1])),
            ],
        )
        .unwrap();
        let mut settings = WriterSettings::default();
        settings.optimize_on_insert = true;
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].descriptor().unwrap().row_count, 1);
        assert_eq!(
            metrics.collapsing_anomalies.load(std::sync::atomic::Ordering::Relaxed),
            0
        );
    }

    #[test]
    fn collapsing_anomaly_above_threshold_is_counted() {
        // Imbalance of two (three +1s against one -1) crosses the ">1"
        // threshold §4.3 actually specifies, unlike scenario 4's literal
        // imbalance-of-one example.
        let dir = tempfile::tempdir().unwrap();
        let columns = TableSchema::new(vec![
            ColumnSchema::new("k", ColumnType::I64),
            ColumnSchema::new("sign", ColumnType::I64),
        ]);
        let snapshot = SchemaSnapshot::new(
            columns,
            PartitionKey::none(),
            SortingKey::new(vec!["k".to_string()]),
            MergingMode::Collapsing {
                sign_column: "sign".to_string(),
            },
        );
        let arrow_schema = Arc::new(ArrowSchema::new(vec![
            Field::new("k", DataType::Int64, false),
            Field::new("sign", DataType::Int64, false),
        ]));
        let b = RecordBatch::try_new(
            arrow_schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 1, 1, 1])),
                Arc::new(Int64Array::from(vec![1, 1, 1, -1])),
            ],
        )
        .unwrap();
        let mut settings = WriterSettings::default();
        settings.optimize_on_insert = true;
        let allocator = TempIndexAllocator::new();
        let factory = ParquetSerializer::default();
        let provider = MockProvider::new(Time::from_timestamp(0));
        let metrics = Arc::new(WriteMetrics::new());

        let parts = write(
            dir.path(),
            &b,
            &snapshot,
            &settings,
            &policy(),
            &allocator,
            &factory,
            &provider,
            &metrics,
        )
        .unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].descriptor().unwrap().row_count, 2);
        assert_eq!(
            metrics.collapsing_anomalies.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }
}
