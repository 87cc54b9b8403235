use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a source table. Always fatal: nothing is rendered
/// from a partially loaded or schema-mismatched table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited text in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read parquet file {}: {source}", .path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("cannot decode record batch in {}: {source}", .path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("{}: missing column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}, row {row}: column '{column}' has non-numeric value '{value}'", .path.display())]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("{}, row {row}: column '{column}' is empty", .path.display())]
    MissingCell {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },
}
