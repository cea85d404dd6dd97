//! Every crate in this workspace logs through `observability_deps::tracing`
//! rather than depending on `tracing` directly, so the logging backend can be
//! swapped in one place.

pub use tracing;
