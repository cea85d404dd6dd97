//! Serializing one written part to Parquet plus its side files: the
//! `OpenSerializer` / `WritePermuted` / `FinalizeAsync` steps of the write
//! orchestrator's state machine.

pub mod writer;

pub use writer::{ParquetSerializer, SerializerFactory, Stream};
