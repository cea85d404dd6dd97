//! Part storage representation selection (§4.9).

/// The on-disk representation chosen for a part, based on its expected size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartType {
    Wide,
    Compact,
    InMemory,
}

/// Thresholds driving [`PartType`] selection.
#[derive(Debug, Clone, Copy)]
pub struct PartTypeThresholds {
    pub min_bytes_for_wide_part: u64,
    pub min_rows_for_wide_part: u64,
    pub in_memory_parts_enable_wal: bool,
}

impl PartTypeThresholds {
    /// Choose a part type for a freshly-written part of `bytes`/`rows`.
    pub fn choose(&self, bytes: u64, rows: u64) -> PartType {
        let below_wide_thresholds =
            bytes < self.min_bytes_for_wide_part && rows < self.min_rows_for_wide_part;

        if !below_wide_thresholds {
            return PartType::Wide;
        }

        if self.in_memory_parts_enable_wal && bytes == 0 {
            // An empty reduction result never reaches this path (the
            // writer short-circuits earlier), but zero-byte parts would
            // otherwise be the "extremely small" case the source reserves
            // for InMemory.
            return PartType::InMemory;
        }

        if self.in_memory_parts_enable_wal && rows <= 1 {
            return PartType::InMemory;
        }

        PartType::Compact
    }

    /// Choose a part type for a projection, inheriting `InMemory` from the
    /// parent rather than re-deriving it from size.
    pub fn choose_for_projection(&self, parent: PartType, bytes: u64, rows: u64) -> PartType {
        if parent == PartType::InMemory {
            return PartType::InMemory;
        }
        self.choose(bytes, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: PartTypeThresholds = PartTypeThresholds {
        min_bytes_for_wide_part: 1024,
        min_rows_for_wide_part: 100,
        in_memory_parts_enable_wal: true,
    };

    #[test]
    fn large_part_is_wide() {
        assert_eq!(THRESHOLDS.choose(2048, 200), PartType::Wide);
    }

    #[test]
    fn tiny_single_row_part_is_in_memory_when_wal_enabled() {
        assert_eq!(THRESHOLDS.choose(10, 1), PartType::InMemory);
    }

    #[test]
    fn small_multi_row_part_is_compact() {
        assert_eq!(THRESHOLDS.choose(10, 5), PartType::Compact);
    }

    #[test]
    fn projection_inherits_in_memory_from_parent() {
        assert_eq!(
            THRESHOLDS.choose_for_projection(PartType::InMemory, 9999, 9999),
            PartType::InMemory
        );
    }
}
