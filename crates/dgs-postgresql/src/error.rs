//! Error types for PostgreSQL loading.

use dgs_core::ConfigError;
use dgs_generator::GeneratorError;
use std::time::Duration;
use thiserror::Error;

/// Errors composing an insert statement.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatementError {
    /// Statement without columns.
    #[error("Table '{0}' has no columns to insert")]
    NoColumns(String),

    /// Statement without rows.
    #[error("Empty batch for table '{0}'")]
    EmptyBatch(String),

    /// Row whose width differs from the column list.
    #[error("Row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// More parameters than the wire protocol allows.
    #[error("Statement needs {count} parameters, the limit is {max}")]
    TooManyParameters { count: usize, max: usize },
}

/// Errors that can occur while populating or introspecting a database.
#[derive(Error, Debug)]
pub enum PopulateError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Write did not finish in time.
    #[error("Write timed out after {0:?}")]
    Timeout(Duration),

    /// Generator error.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// Statement composition error.
    #[error("Statement error: {0}")]
    Statement(#[from] StatementError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure inside a worker.
    #[error("Worker {worker} failed on table '{table}': {source}")]
    Worker {
        worker: usize,
        table: String,
        #[source]
        source: Box<PopulateError>,
    },

    /// Worker task panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Column type introspection cannot map.
    #[error("Unsupported type '{data_type}' for column '{table}.{column}'")]
    UnsupportedColumnType {
        table: String,
        column: String,
        data_type: String,
    },
}
