//! The catalog collaborator: the read-only schema snapshot and settings the
//! write path is handed for each call, plus the optional transaction
//! threaded through serializer opening.

pub mod interface;

pub use interface::{Projection, ProjectionType, SchemaSnapshot, Transaction, WriterSettings};
