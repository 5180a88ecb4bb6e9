//! Error types for report ingestion

use thiserror::Error;

use crate::storage::StorageError;

/// A size or rate string that could not be turned into an integer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is negative")]
    Negative(String),

    #[error("'{0}' is too large to store")]
    Overflow(String),

    #[error("'{0}' is not a YYYY-MM month")]
    InvalidMonth(String),
}

/// Why an ingestion call did not store anything
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no data provided")]
    EmptyInput,

    #[error("no valid data found")]
    NoValidData,

    #[error("unknown interface '{0}'")]
    UnknownInterface(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}
