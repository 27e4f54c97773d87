//! Error types for the reservoir library.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading measurements from storage.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database rejected a query or the connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The storage calls did not finish before the request deadline.
    #[error("Storage deadline of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    /// The connection settings cannot form a valid URL.
    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

/// The query a paged read was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStage {
    /// Counting the distinct days in range.
    Count,
    /// Fetching one page of readings.
    Page,
}

impl fmt::Display for ReadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStage::Count => f.write_str("count"),
            ReadStage::Page => f.write_str("page"),
        }
    }
}

/// A failed paged read, tagged with the query that failed.
#[derive(Error, Debug)]
#[error("{stage} query failed: {source}")]
pub struct ReadError {
    pub stage: ReadStage,
    #[source]
    pub source: StoreError,
}

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
