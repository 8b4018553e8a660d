//! Run ids and output roots.
//!
//! Every stage that produces a tree writes it into a fresh directory named
//! after the moment the run started, e.g. `Outputs/20250314-093015`. The
//! identifier stage appends a suffix (`_identified` by default).

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use stockshot_storage::error::ErrorKind as StorageErrorKind;
use time::OffsetDateTime;
use time::macros::format_description;

/// A local timestamp in `YYYYMMDD-HHMMSS` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(String);
impl RunId {
    /// The run id for the current local time. Falls back to UTC when the
    /// local offset can't be determined.
    pub fn now() -> Self {
        Self::at(OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()))
    }

    pub fn at(moment: OffsetDateTime) -> Self {
        let format = format_description!("[year][month][day]-[hour][minute][second]");
        // Formatting only fails for components the description doesn't use.
        Self(moment.format(format).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The output root for this run under `base`, with an optional suffix.
    pub fn output_root(&self, base: &Path, suffix: &str) -> PathBuf {
        base.join(format!("{}{suffix}", self.0))
    }
}
impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Creates a stage's output root. Nothing is created on a dry run.
///
/// # Errors
/// [`ErrorKind::OutputExists`] when the directory is already there, since a
/// stage must never write into an earlier run's output.
pub(crate) async fn create_output_root(root: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        return Ok(());
    }
    match stockshot_storage::create_dir_new(root).await {
        Ok(()) => {
            tracing::info!(path = %root.display(), "Created output root");
            Ok(())
        },
        Err(e) if matches!(&*e, StorageErrorKind::AlreadyExists(_)) => {
            exn::bail!(ErrorKind::OutputExists(root.to_path_buf()))
        },
        Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
    }
}
