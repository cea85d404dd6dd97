//! Plain, read-only values handed to the write path: the schema snapshot
//! a table presents for a given call, and the settings controlling how the
//! writer behaves.

use data_types::{ColumnSchema, MergingMode, PartTypeThresholds, PartitionKey, SkipIndex, SortingKey, TtlEntry};
use schema::Schema;

/// The kind of projection auxiliary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    /// A plain re-sort of the main block.
    Normal,
    /// Forces `MergingMode::Aggregating` on the projection's reducer
    /// regardless of the parent table's mode.
    Aggregate,
}

/// One auxiliary projection declared on a table: `(name, query, type,
/// child_metadata)` as described by the write orchestrator's Projection
/// Writer step.
#[derive(Debug, Clone)]
pub struct Projection {
    pub name: String,
    /// The expression selecting/transforming columns for this projection's
    /// block (`projection.calculate(block, context)`).
    pub query: Vec<data_types::Expr>,
    pub projection_type: ProjectionType,
    pub child_schema: SchemaSnapshot,
}

/// The read-only schema snapshot a table presents for one `writeTempPart`
/// call: the column list, its keys, its TTL declarations, its auxiliary
/// projections and its merging mode. Analogous to the role a namespace's
/// schema plays for the rest of the write path — a plain value, never
/// mutated by the writer.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub columns: Schema,
    pub partition_key: PartitionKey,
    pub sorting_key: SortingKey,
    pub skip_indices: Vec<SkipIndex>,
    pub ttl_entries: Vec<TtlEntry>,
    pub projections: Vec<Projection>,
    pub merging_mode: MergingMode,
}

impl SchemaSnapshot {
    pub fn new(columns: Schema, partition_key: PartitionKey, sorting_key: SortingKey, merging_mode: MergingMode) -> Self {
        Self {
            columns,
            partition_key,
            sorting_key,
            skip_indices: Vec::new(),
            ttl_entries: Vec::new(),
            projections: Vec::new(),
            merging_mode,
        }
    }

    pub fn with_skip_indices(mut self, skip_indices: Vec<SkipIndex>) -> Self {
        self.skip_indices = skip_indices;
        self
    }

    pub fn with_ttl_entries(mut self, ttl_entries: Vec<TtlEntry>) -> Self {
        self.ttl_entries = ttl_entries;
        self
    }

    pub fn with_projections(mut self, projections: Vec<Projection>) -> Self {
        self.projections = projections;
        self
    }
}

/// The Context settings the write path reads for one call — bundles every
/// knob named in the writer's external contract into the struct-of-settings
/// shape used elsewhere in this workspace for per-database configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriterSettings {
    /// Run a sanity merge pass immediately after writing, folding
    /// newly-written parts together when cheap to do so.
    pub optimize_on_insert: bool,
    /// fsync the part's data file(s) before returning from `finalize()`.
    pub fsync_after_insert: bool,
    /// fsync the part's temp directory entry itself (metadata durability,
    /// distinct from file-content durability).
    pub fsync_part_directory: bool,
    /// The observed default-value density above which a column is
    /// serialized using the sparse encoding path.
    pub ratio_of_defaults_for_sparse_serialization: f64,
    /// Whether `TemporaryPart`'s descriptor carries a `Uuid` part identity.
    pub assign_part_uuids: bool,
    /// A soft ceiling on live parts per table; exceeding it at partition
    /// discovery time raises `TooManyParts`.
    pub max_parts: usize,
    /// Part-type selection thresholds (§4.9).
    pub part_type_thresholds: PartTypeThresholds,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            optimize_on_insert: false,
            fsync_after_insert: false,
            fsync_part_directory: false,
            ratio_of_defaults_for_sparse_serialization: 0.9,
            assign_part_uuids: true,
            max_parts: 10_000,
            part_type_thresholds: PartTypeThresholds {
                min_bytes_for_wide_part: 10 * 1024 * 1024,
                min_rows_for_wide_part: 0,
                in_memory_parts_enable_wal: false,
            },
        }
    }
}

/// The current transaction, optionally threaded through `OpenSerializer` so
/// the serializer factory can participate in a larger unit of work. Most
/// callers write outside of any transaction, so every method is optional.
pub trait Transaction: std::fmt::Debug + Send + Sync {
    /// A free-form identifier for logging/tracing correlation.
    fn id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_assign_uuids_and_skip_fsync() {
        let settings = WriterSettings::default();
        assert!(settings.assign_part_uuids);
        assert!(!settings.fsync_after_insert);
    }
}
