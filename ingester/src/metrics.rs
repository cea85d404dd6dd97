//! Lock-free profile-event counters for one write call, in the teacher's
//! small-struct-of-atomics style (see e.g. `ChunkMetrics`/`PartitionMetrics`
//! in the rest of this workspace).

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters incremented over the lifetime of a single `writeTempPart` call.
/// Cheap to construct; never shared across calls, so `Relaxed` ordering is
/// sufficient everywhere.
#[derive(Debug, Default)]
pub struct WriteMetrics {
    pub partitions_discovered: AtomicU64,
    pub already_sorted: AtomicU64,
    pub rows_sorted: AtomicU64,
    pub rows_reduced_away: AtomicU64,
    pub collapsing_anomalies: AtomicU64,
    pub projections_written: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl WriteMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_partitions_discovered(&self) {
        self.partitions_discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_already_sorted(&self) {
        self.already_sorted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_sorted(&self, n: u64) {
        self.rows_sorted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_rows_reduced_away(&self, n: u64) {
        self.rows_reduced_away.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_collapsing_anomalies(&self) {
        self.collapsing_anomalies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_projections_written(&self) {
        self.projections_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_written(&self, n: u64) {
        self.bytes_written.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let m = WriteMetrics::new();
        assert_eq!(m.rows_sorted.load(Ordering::Relaxed), 0);
        m.add_rows_sorted(5);
        m.add_rows_sorted(3);
        assert_eq!(m.rows_sorted.load(Ordering::Relaxed), 8);
    }
}
