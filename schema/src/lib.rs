//! The schema snapshot's column/type model, shared between the catalog
//! collaborator and the write path.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use data_types::{ColumnSchema, ColumnType};
use snafu::Snafu;

/// The reserved name of the time column every table carries.
pub const TIME_COLUMN_NAME: &str = "time";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("column {} missing from block (declared in schema)", name))]
    MissingColumn { name: String },

    #[snafu(display(
        "column {} has type {:?} in block, but schema declares {:?}",
        name,
        actual,
        expected
    ))]
    TypeMismatch {
        name: String,
        expected: DataType,
        actual: DataType,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Map a declared [`ColumnType`] to its concrete Arrow type. `Object`
/// columns have no fixed Arrow type — callers must deduce one from the
/// incoming block before calling this (see [`Schema::concrete_arrow_type`]).
pub fn arrow_type_for(column_type: ColumnType) -> Option<DataType> {
    match column_type {
        ColumnType::Bool => Some(DataType::Boolean),
        ColumnType::I64 => Some(DataType::Int64),
        ColumnType::U64 => Some(DataType::UInt64),
        ColumnType::F64 => Some(DataType::Float64),
        ColumnType::String => Some(DataType::Utf8),
        ColumnType::Timestamp => Some(DataType::Timestamp(TimeUnit::Nanosecond, None)),
        ColumnType::Object => None,
    }
}

/// A table's schema snapshot: the column list the catalog declares for this
/// table, independent of any one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check that `batch` satisfies this schema: every declared non-`Object`
    /// column must be present with the expected Arrow type. `Object`
    /// columns are satisfied by presence alone — their concrete type is
    /// deduced per-block by the writer, not checked here.
    pub fn check(&self, batch: &RecordBatch) -> Result<()> {
        let arrow_schema = batch.schema();
        for col in &self.columns {
            let field = arrow_schema
                .field_with_name(&col.name)
                .ok()
                .context_or_missing(&col.name)?;
            if let Some(expected) = arrow_type_for(col.column_type) {
                if field.data_type() != &expected {
                    return TypeMismatchSnafu {
                        name: col.name.clone(),
                        expected,
                        actual: field.data_type().clone(),
                    }
                    .fail();
                }
            }
        }
        Ok(())
    }

    /// Deduce the concrete Arrow type for each `Object`-typed column from
    /// `batch`, returning a schema scoped to this part only (design note,
    /// spec §9: the catalog's abstract declaration is never mutated).
    pub fn with_concrete_object_types(&self, batch: &RecordBatch) -> Self {
        let arrow_schema = batch.schema();
        let columns = self
            .columns
            .iter()
            .map(|c| {
                if c.column_type != ColumnType::Object {
                    return c.clone();
                }
                match arrow_schema.field_with_name(&c.name) {
                    Ok(field) => ColumnSchema::new(c.name.clone(), concrete_type_for(field)),
                    Err(_) => c.clone(),
                }
            })
            .collect();
        Self { columns }
    }

    /// The Arrow schema this table's columns would produce, useful for
    /// building an empty/placeholder `RecordBatch`.
    pub fn as_arrow(&self) -> SchemaRef {
        let fields = self
            .columns
            .iter()
            .filter_map(|c| arrow_type_for(c.column_type).map(|dt| Field::new(&c.name, dt, true)))
            .collect::<Vec<_>>();
        Arc::new(ArrowSchema::new(fields))
    }
}

fn concrete_type_for(field: &Field) -> ColumnType {
    match field.data_type() {
        DataType::Boolean => ColumnType::Bool,
        DataType::Int64 => ColumnType::I64,
        DataType::UInt64 => ColumnType::U64,
        DataType::Float64 => ColumnType::F64,
        DataType::Utf8 => ColumnType::String,
        DataType::Timestamp(_, _) => ColumnType::Timestamp,
        _ => ColumnType::Object,
    }
}

trait OptionContextExt<T> {
    fn context_or_missing(self, name: &str) -> Result<T>;
}

impl<T> OptionContextExt<T> for Option<T> {
    fn context_or_missing(self, name: &str) -> Result<T> {
        self.ok_or_else(|| Error::MissingColumn {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use std::sync::Arc as StdArc;

    fn batch() -> RecordBatch {
        let schema = StdArc::new(ArrowSchema::new(vec![
            Field::new("k", DataType::Int64, false),
            Field::new("v", DataType::Utf8, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                StdArc::new(Int64Array::from(vec![1, 2])),
                StdArc::new(StringArray::from(vec!["a", "b"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn check_passes_for_matching_schema() {
        let schema = Schema::new(vec![
            ColumnSchema::new("k", ColumnType::I64),
            ColumnSchema::new("v", ColumnType::String),
        ]);
        assert!(schema.check(&batch()).is_ok());
    }

    #[test]
    fn check_fails_for_missing_column() {
        let schema = Schema::new(vec![ColumnSchema::new("missing", ColumnType::I64)]);
        assert!(matches!(
            schema.check(&batch()),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn object_column_deduces_concrete_type() {
        let schema = Schema::new(vec![ColumnSchema::new("v", ColumnType::Object)]);
        let concrete = schema.with_concrete_object_types(&batch());
        assert_eq!(concrete.column("v").unwrap().column_type, ColumnType::String);
    }
}
