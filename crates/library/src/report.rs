//! Per-item results and stage summaries.

use derive_more::Display;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// The pipeline stage a [`Summary`] belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    #[display("colour")]
    Colour,
    #[display("order")]
    Position,
    #[display("identify")]
    Identify,
    #[display("rekey")]
    Rekey,
    #[display("front")]
    Front,
    #[display("pack")]
    Pack,
}

/// Why an item was left alone. None of these are errors.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The target already exists; nothing is ever overwritten.
    #[display("target exists")]
    Collision,
    /// The leaf has no (usable) colour sequence.
    #[display("no colours")]
    NoColours,
    /// A plan names a folder that isn't a discovered leaf.
    #[display("not a leaf")]
    NotALeaf,
    /// The file name already carries an identifier.
    #[display("already identified")]
    AlreadyIdentified,
    /// The key is not in the identifier table.
    #[display("unresolved")]
    Unresolved,
    /// No variant tag could be parsed from the file name.
    #[display("unparsed")]
    Unparsed,
    /// The file sits too high in the tree to derive a key.
    #[display("empty key")]
    EmptyKey,
    /// The directory a file should be placed in does not exist.
    #[display("no target directory")]
    NoTarget,
}

/// The result of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Copied { from: PathBuf, to: PathBuf },
    Renamed { from: PathBuf, to: PathBuf },
    /// Dry-run: what would have been copied or renamed.
    Planned { from: PathBuf, to: PathBuf },
    Archived { path: PathBuf, entries: usize, bytes: u64 },
    Skipped { path: PathBuf, reason: SkipReason },
    /// A whole unit (leaf, base folder, plan entry) was abandoned.
    Failed { unit: String, reason: String },
}

/// Everything a stage did, in the order it did it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub stage: Stage,
    /// Where the stage wrote its results, if anywhere.
    pub output: Option<PathBuf>,
    pub outcomes: Vec<Outcome>,
}
impl Summary {
    pub fn new(stage: Stage) -> Self {
        Self { stage, output: None, outcomes: Vec::new() }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Records an outcome and logs it.
    pub fn record(&mut self, outcome: Outcome) {
        match &outcome {
            Outcome::Copied { from, to } => {
                tracing::debug!(from = %from.display(), to = %to.display(), "Copied");
            },
            Outcome::Renamed { from, to } => {
                tracing::info!(from = %from.display(), to = %to.display(), "Renamed");
            },
            Outcome::Planned { from, to } => {
                tracing::info!(from = %from.display(), to = %to.display(), "Would write");
            },
            Outcome::Archived { path, entries, bytes } => {
                tracing::info!(path = %path.display(), entries, bytes, "Wrote archive");
            },
            Outcome::Skipped { path, reason: reason @ SkipReason::AlreadyIdentified } => {
                tracing::debug!(path = %path.display(), %reason, "Skipped");
            },
            Outcome::Skipped { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "Skipped");
            },
            Outcome::Failed { unit, reason } => {
                tracing::error!(%unit, %reason, "Failed");
            },
        }
        self.outcomes.push(outcome);
    }

    pub(crate) fn copied(&mut self, from: &Path, to: &Path) {
        self.record(Outcome::Copied { from: from.to_path_buf(), to: to.to_path_buf() });
    }

    pub(crate) fn renamed(&mut self, from: &Path, to: &Path) {
        self.record(Outcome::Renamed { from: from.to_path_buf(), to: to.to_path_buf() });
    }

    pub(crate) fn planned(&mut self, from: &Path, to: &Path) {
        self.record(Outcome::Planned { from: from.to_path_buf(), to: to.to_path_buf() });
    }

    pub(crate) fn archived(&mut self, path: &Path, entries: usize, bytes: u64) {
        self.record(Outcome::Archived { path: path.to_path_buf(), entries, bytes });
    }

    pub(crate) fn skipped(&mut self, path: &Path, reason: SkipReason) {
        self.record(Outcome::Skipped { path: path.to_path_buf(), reason });
    }

    pub(crate) fn failed(&mut self, unit: impl Into<String>, reason: impl FmtDisplay) {
        let unit = unit.into();
        // The tree root itself has an empty key.
        let unit = if unit.is_empty() { ".".to_string() } else { unit };
        self.record(Outcome::Failed { unit, reason: reason.to_string() });
    }

    fn count(&self, f: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| f(o)).count()
    }

    pub fn copied_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Copied { .. }))
    }

    pub fn renamed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Renamed { .. }))
    }

    pub fn planned_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Planned { .. }))
    }

    pub fn archived_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Archived { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// Number of items skipped for exactly `reason`.
    pub fn skipped_for(&self, reason: &SkipReason) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { reason: r, .. } if r == reason))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Destination paths of everything copied, renamed or planned.
    pub fn targets(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Copied { to, .. } | Outcome::Renamed { to, .. } | Outcome::Planned { to, .. } => Some(to.as_path()),
            _ => None,
        })
    }
}
impl FmtDisplay for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:", self.stage)?;
        let counts = [
            (self.copied_count(), "copied"),
            (self.renamed_count(), "renamed"),
            (self.planned_count(), "planned"),
            (self.archived_count(), "archived"),
            (self.skipped_count(), "skipped"),
            (self.failed_count(), "failed"),
        ];
        let mut parts = counts.iter().filter(|(n, _)| *n > 0).map(|(n, label)| format!("{n} {label}")).peekable();
        if parts.peek().is_none() {
            return f.write_str(" nothing to do");
        }
        write!(f, " {}", parts.collect::<Vec<_>>().join(", "))
    }
}
