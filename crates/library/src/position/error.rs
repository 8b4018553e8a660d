//! Per-leaf planning errors for the [`position`](super) stage.
//!
//! None of these escape the stage: a leaf that fails to plan is recorded in
//! the [`Summary`](crate::Summary) and its siblings carry on.

use derive_more::{Display, Error};

/// A planning error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The leaf holds fewer images than the permutation covers.
    #[display("leaf has {found} images but the permutation needs {needed}")]
    TooFewImages { found: usize, needed: usize },
    /// Two images would end up with the same name.
    #[display("more than one image would be named {_0}")]
    DuplicateTarget(#[error(not(source))] String),
    /// The leaf could not be listed.
    #[display("failed to read leaf")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
