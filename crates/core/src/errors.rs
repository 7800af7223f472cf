//! Core error types for Tallyfolio.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::brokers::Broker;
use crate::imports::ImportMode;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the import engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Fatal import errors. Row-level problems never surface here; they are
/// reported as warnings on the normalized result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// A required logical column could not be located in the header row.
    #[error("{broker} export is missing a required '{column}' column")]
    MissingColumn { broker: Broker, column: String },

    /// Every data row was rejected (or there were none).
    #[error("No valid rows found in {broker} export")]
    NoValidRows { broker: Broker },

    /// The broker cannot be used with the requested parse mode.
    #[error("Broker '{broker}' does not support {mode} imports")]
    UnsupportedBroker { broker: Broker, mode: ImportMode },

    /// The broker identifier is not one of the known sources.
    #[error("Unknown broker '{0}'")]
    UnknownBroker(String),

    #[error("Import payload is empty")]
    EmptyPayload,
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

impl Error {
    /// Returns the typed import error, if this is one.
    pub fn as_import_error(&self) -> Option<&ImportError> {
        match self {
            Error::Import(e) => Some(e),
            _ => None,
        }
    }
}
