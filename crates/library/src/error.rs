//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only stage-aborting conditions surface as errors. Anything scoped to a
//! single leaf, file or plan entry is recorded as an
//! [`Outcome`](crate::Outcome) in the stage [`Summary`](crate::Summary)
//! instead.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a stage failure.
///
/// ### Environment Errors
/// Raised before anything is written.
/// - [`ErrorKind::Discovery`]
/// - [`ErrorKind::Table`]
/// - [`ErrorKind::Plan`]
/// - [`ErrorKind::OutputExists`]
///
/// ### Operational Errors
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Archive`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The input tree could not be walked (missing root, unreadable directory).
    #[display("failed to discover input tree")]
    Discovery,
    /// The identifier table could not be loaded.
    #[display("failed to load identifier table")]
    Table,
    /// A plan file could not be read or is not valid JSON of the right shape.
    #[display("failed to read plan")]
    Plan,
    /// The output root for this run already exists.
    #[display("output root already exists: {}", _0.display())]
    OutputExists(#[error(not(source))] PathBuf),
    /// A filesystem operation outside of any single leaf failed.
    #[display("storage operation failed")]
    Storage,
    /// An archive could not be written.
    #[display("failed to write archive")]
    Archive,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A new run id is minted every second.
        matches!(self, Self::OutputExists(_) | Self::Storage | Self::Archive)
    }
}
