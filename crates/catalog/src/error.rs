//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The identifier table does not exist; fetch it before running.
    #[display("identifier table not found: {}", _0.display())]
    TableNotFound(#[error(not(source))] PathBuf),
    /// The identifier table exists but could not be read as CSV.
    #[display("malformed identifier table: {_0}")]
    MalformedTable(#[error(not(source))] String),
    /// The identifier table header lacks a required column.
    #[display("identifier table is missing the '{_0}' column")]
    MissingColumn(#[error(not(source))] &'static str),
    /// A value could not be parsed.
    #[display("failed to parse {field}, found value: {value}")]
    ParseError {
        /// What was being parsed.
        field: &'static str,
        /// The offending input.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The table is read once; a missing file may appear once the fetch
        // step has run, nothing else changes between attempts.
        matches!(self, Self::TableNotFound(_))
    }
}
