//! Errors raised while building or slicing a [`crate::Block`].

use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("arrow error: {}", source))]
    Arrow { source: arrow::error::ArrowError },

    #[snafu(display("type mismatch: {}", message))]
    TypeMismatch { message: String },
}

impl From<arrow::error::ArrowError> for Error {
    fn from(source: arrow::error::ArrowError) -> Self {
        Error::Arrow { source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
