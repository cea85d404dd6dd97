//! Deterministic part naming.

use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("part spans more than one month: {} .. {}", min_ymd, max_ymd))]
    SpansMoreThanOneMonth { min_ymd: String, max_ymd: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A part's deterministic on-disk name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartName {
    /// The legacy encoding, predating custom partitioning: valid only when
    /// the partition is a single date column whose min and max fall in the
    /// same month.
    V0 {
        min_ymd: String,
        max_ymd: String,
        lo: u64,
        hi: u64,
        level: u32,
    },
    /// The custom-partitioning encoding.
    V1 {
        partition_id: String,
        lo: u64,
        hi: u64,
        level: u32,
    },
}

impl PartName {
    /// Build a v0 name, checking the single-month invariant. `min_date` and
    /// `max_date` are `(year, month, day)` triples.
    pub fn v0(
        min_date: (i32, u32, u32),
        max_date: (i32, u32, u32),
        temp_index: u64,
    ) -> Result<Self> {
        let (min_year, min_month, _) = min_date;
        let (max_year, max_month, _) = max_date;
        if (min_year, min_month) != (max_year, max_month) {
            return SpansMoreThanOneMonthSnafu {
                min_ymd: format!("{min_year}-{min_month:02}"),
                max_ymd: format!("{max_year}-{max_month:02}"),
            }
            .fail();
        }
        let (y0, m0, d0) = min_date;
        let (y1, m1, d1) = max_date;
        Ok(Self::V0 {
            min_ymd: format!("{y0:04}{m0:02}{d0:02}"),
            max_ymd: format!("{y1:04}{m1:02}{d1:02}"),
            lo: temp_index,
            hi: temp_index,
            level: 0,
        })
    }

    /// Build a v1 name.
    pub fn v1(partition_id: impl Into<String>, temp_index: u64) -> Self {
        Self::V1 {
            partition_id: partition_id.into(),
            lo: temp_index,
            hi: temp_index,
            level: 0,
        }
    }

    /// Render the deterministic directory-name fragment.
    pub fn format(&self) -> String {
        match self {
            PartName::V0 {
                min_ymd,
                max_ymd,
                lo,
                hi,
                level,
            } => format!("{min_ymd}_{max_ymd}_{lo}_{hi}_{level}"),
            PartName::V1 {
                partition_id,
                lo,
                hi,
                level,
            } => format!("{partition_id}_{lo}_{hi}_{level}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v0_rejects_cross_month_span() {
        let err = PartName::v0((2024, 1, 31), (2024, 2, 1), 7).unwrap_err();
        assert!(matches!(err, Error::SpansMoreThanOneMonth { .. }));
    }

    #[test]
    fn v0_formats_same_month() {
        let name = PartName::v0((2024, 1, 1), (2024, 1, 31), 7).unwrap();
        assert_eq!(name.format(), "20240101_20240131_7_7_0");
    }

    #[test]
    fn v1_formats_partition_id() {
        let name = PartName::v1("all", 3);
        assert_eq!(name.format(), "all_3_3_0");
    }
}
