//! TTL declarations and the per-category summaries folded from them.

use time::Time;

use crate::expr::Expr;

/// The six categories of TTL expression a schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlCategory {
    /// A single, table-wide rows-TTL (drives deletion).
    Rows,
    /// Per-result group-by TTL (rolls a group up before deleting the rest).
    GroupBy,
    /// Per-result rows-where TTL (deletes rows matching a predicate once
    /// expired).
    RowsWhere,
    /// Per-column TTL (resets a column to its default once expired).
    Columns,
    /// Per-result recompression TTL (does not affect deletion).
    Recompression,
    /// Per-result move TTL (drives volume placement, see the space
    /// reserver).
    Move,
}

impl TtlCategory {
    /// `true` for the categories that feed the part-wide rows-TTL rollup.
    /// Move and recompression TTLs are excluded per spec.
    pub fn updates_part_wide_summary(&self) -> bool {
        !matches!(self, TtlCategory::Move | TtlCategory::Recompression)
    }
}

/// One TTL declaration from the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TtlEntry {
    pub category: TtlCategory,
    pub expression: Expr,
    /// For `Columns` entries, the column that gets reset on expiry.
    pub column: Option<String>,
}

impl TtlEntry {
    pub fn new(category: TtlCategory, expression: Expr) -> Self {
        Self {
            category,
            expression,
            column: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// The `{min_timestamp, max_timestamp}` folded from one TTL entry's
/// evaluated column over a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TtlInfo {
    pub min: Option<Time>,
    pub max: Option<Time>,
}

impl TtlInfo {
    /// Fold one observed value into this running interval.
    pub fn update(&mut self, v: Time) {
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    /// Merge another interval's bounds into this one.
    pub fn merge(&mut self, other: &TtlInfo) {
        if let Some(v) = other.min {
            self.update(v);
        }
        if let Some(v) = other.max {
            self.update(v);
        }
    }
}

/// The aggregated TTL summary for an entire part: one [`TtlInfo`] per
/// declared entry, plus the part-wide rows-category rollup.
///
/// Only categories actually referenced by the schema get an entry —
/// `Vec`s stay empty rather than being padded with defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartTtlInfos {
    pub rows: Option<TtlInfo>,
    pub group_by: Vec<TtlInfo>,
    pub rows_where: Vec<TtlInfo>,
    pub columns: Vec<(String, TtlInfo)>,
    pub recompression: Vec<TtlInfo>,
    pub move_ttl: Vec<TtlInfo>,
    /// The part-wide min/max over every rows/group-by/rows-where/columns
    /// entry (move and recompression do not contribute).
    pub part_wide: Option<TtlInfo>,
}

impl PartTtlInfos {
    /// Fold `info` for `entry` into the appropriate category bucket, and
    /// update the part-wide rollup when the category counts toward it.
    pub fn record(&mut self, entry: &TtlEntry, info: TtlInfo) {
        match entry.category {
            TtlCategory::Rows => {
                let slot = self.rows.get_or_insert_with(TtlInfo::default);
                slot.merge(&info);
            }
            TtlCategory::GroupBy => self.group_by.push(info),
            TtlCategory::RowsWhere => self.rows_where.push(info),
            TtlCategory::Columns => {
                let column = entry.column.clone().unwrap_or_default();
                self.columns.push((column, info));
            }
            TtlCategory::Recompression => self.recompression.push(info),
            TtlCategory::Move => self.move_ttl.push(info),
        }

        if entry.category.updates_part_wide_summary() {
            let slot = self.part_wide.get_or_insert_with(TtlInfo::default);
            slot.merge(&info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_and_recompression_do_not_touch_part_wide_rollup() {
        let mut infos = PartTtlInfos::default();
        let entry = TtlEntry::new(TtlCategory::Move, Expr::column("t"));
        infos.record(
            &entry,
            TtlInfo {
                min: Some(Time::from_timestamp(10)),
                max: Some(Time::from_timestamp(20)),
            },
        );
        assert!(infos.part_wide.is_none());
        assert_eq!(infos.move_ttl.len(), 1);
    }

    #[test]
    fn rows_category_updates_part_wide_rollup() {
        let mut infos = PartTtlInfos::default();
        let entry = TtlEntry::new(TtlCategory::Rows, Expr::column("t"));
        infos.record(
            &entry,
            TtlInfo {
                min: Some(Time::from_timestamp(10)),
                max: Some(Time::from_timestamp(20)),
            },
        );
        let pw = infos.part_wide.unwrap();
        assert_eq!(pw.min, Some(Time::from_timestamp(10)));
        assert_eq!(pw.max, Some(Time::from_timestamp(20)));
    }
}
