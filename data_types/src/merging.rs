//! `MergingMode`: the reduction semantics applied to rows that share a
//! SortingKey equivalence class, both during insert (when
//! `optimize_on_insert` is set) and, later, during background merges (out of
//! scope for this crate — only the shape of the mode is shared).

/// One retention rule in a [`MergingMode::Graphite`] configuration: rows
/// older than `age_threshold_secs` (relative to "now") are bucketed at
/// `precision_secs` and summed per `aggregate`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphiteRetention {
    pub age_threshold_secs: i64,
    pub precision_secs: i64,
}

/// A Graphite-style rollup rule: a glob `pattern` matched against a metric
/// name column, paired with its retention ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphiteRule {
    pub pattern: String,
    pub retentions: Vec<GraphiteRetention>,
    pub aggregate: GraphiteAggregate,
}

/// The aggregate applied within one retention bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphiteAggregate {
    Sum,
    Max,
    Min,
    Average,
    Last,
}

/// The reduction algorithm applied to rows sharing a SortingKey equivalence
/// class.
#[derive(Debug, Clone, PartialEq)]
pub enum MergingMode {
    /// No reduction: every row survives, in sorted order.
    Ordinary,
    /// Keep the row with the maximum `version_column` in each class (or the
    /// last row in input order if no version column is configured).
    Replacing { version_column: Option<String> },
    /// Cancel +1/-1 pairs (read from `sign_column`) within a class, keeping
    /// any surplus.
    Collapsing { sign_column: String },
    /// Keep one row per class; sum `columns_to_sum` across the class; all
    /// other non-key columns take the first row's value.
    Summing {
        columns_to_sum: Vec<String>,
        partition_columns: Vec<String>,
    },
    /// Merge `AggregateFunction`-typed columns via their `merge` semantics;
    /// one row per class.
    Aggregating,
    /// Like `Collapsing`, but the equivalence class also requires matching
    /// `version_column`; cancellation is pairwise over adjacent rows.
    VersionedCollapsing { sign_column: String, version_column: String },
    /// Time-bucketed retention rollup.
    Graphite { rules: Vec<GraphiteRule> },
}

impl MergingMode {
    /// `true` for the no-op mode, where the reducer is skipped entirely.
    pub fn is_ordinary(&self) -> bool {
        matches!(self, MergingMode::Ordinary)
    }
}
