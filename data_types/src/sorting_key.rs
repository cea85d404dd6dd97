//! The sorting key and the skip indices evaluated alongside it.

use crate::expr::Expr;

/// An ordered list of column names defining a part's lexicographic order.
/// May be empty, meaning the part carries no sort order at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortingKey(Vec<String>);

impl SortingKey {
    /// Construct a sorting key from an ordered column list.
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    /// The empty sorting key (no sort).
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// `true` if this part carries no sort order.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sort columns, in comparison priority order.
    pub fn columns(&self) -> &[String] {
        &self.0
    }
}

/// An auxiliary index built alongside the part to accelerate range scans.
/// Skip indices may declare their own expression (e.g. a bloom filter over
/// `lower(url)`), which — like sort-key expressions — may add a materialized
/// column to the block before sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipIndex {
    pub name: String,
    pub expression: Expr,
}
