//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested compression method is not supported.
    #[display("unsupported compression: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The archive file already exists; archives are never overwritten.
    #[display("archive already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// A file that was packed could not be read.
    #[display("cannot read {}", _0.display())]
    Source(#[error(not(source))] PathBuf),
    /// Writing the archive failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io | ErrorKind::Source(_))
    }
}
