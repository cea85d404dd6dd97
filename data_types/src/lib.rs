//! Plain data shared between the write path and the collaborators it
//! consumes: the partition/sorting keys, the merging-mode taxonomy, TTL
//! declarations and their folded summaries, the min/max index, and
//! deterministic part naming.

pub mod column;
pub mod expr;
pub mod hash;
pub mod merging;
pub mod minmax;
pub mod part_name;
pub mod part_type;
pub mod partition_key;
pub mod sorting_key;
pub mod temp_index;
pub mod ttl;
pub mod value;

pub use column::{ColumnSchema, ColumnType};
pub use expr::Expr;
pub use merging::{GraphiteAggregate, GraphiteRetention, GraphiteRule, MergingMode};
pub use minmax::MinMaxIndex;
pub use part_name::PartName;
pub use part_type::{PartType, PartTypeThresholds};
pub use partition_key::PartitionKey;
pub use sorting_key::{SkipIndex, SortingKey};
pub use temp_index::TempIndexAllocator;
pub use ttl::{PartTtlInfos, TtlCategory, TtlEntry, TtlInfo};
pub use value::Value;
