//! Command-line error types.

use derive_more::{Display, Error};
use std::path::PathBuf;
use stockshot_library::Stage;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded or is invalid.
    #[display("invalid configuration")]
    Config,
    /// A command-line value could not be understood.
    #[display("invalid argument: {_0}")]
    Argument(#[error(not(source))] String),
    #[display("cannot use plan {}", _0.display())]
    Plan(#[error(not(source))] PathBuf),
    #[display("cannot use identifier table {}", _0.display())]
    Table(#[error(not(source))] PathBuf),
    /// A stage aborted before (or while) writing anything.
    #[display("{_0} stage aborted")]
    Stage(#[error(not(source))] Stage),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Stage(_))
    }
}
