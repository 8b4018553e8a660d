//! The reorganization pipeline.
//!
//! Each stage reads a tree, never modifies it (except [`identify::rename`]
//! and [`front`], which work in place by definition), and writes its result
//! into a fresh output root:
//!
//! 1. [`colour`]: split every leaf into colour buckets.
//! 2. [`position`]: rename images to `PT##` tags through a permutation.
//! 3. [`identify`]: rename to `<identifier>.<VARIANT>.<ext>`.
//! 4. [`pack`]: bundle the final tree into size-bounded zip archives.
//!
//! Stages return a [`Summary`] of per-item [`Outcome`]s. Only conditions that
//! make the whole stage meaningless (missing root, unreadable table, existing
//! output root) are returned as errors.

pub mod colour;
pub mod error;
pub mod front;
pub mod identify;
mod output;
pub mod pack;
pub mod plan;
pub mod position;
mod report;

pub use crate::output::RunId;
pub use crate::plan::{ColourPlan, OrderPlan, Permutation};
pub use crate::report::{Outcome, SkipReason, Stage, Summary};
use std::num::NonZeroUsize;
use stockshot_storage::ImageFilter;

/// Upper bound on leaves planned at the same time.
pub const MAX_PLANNING_CONCURRENCY: usize = 8;

/// `min(8, cores)`.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1).min(MAX_PLANNING_CONCURRENCY)
}

/// Settings shared by every stage.
#[derive(Debug, Clone)]
pub struct Context {
    pub filter: ImageFilter,
    /// Plan and report, but write nothing.
    pub dry_run: bool,
    /// Added to each permutation value to form a position tag.
    pub offset: u32,
    /// Minimum digits in a position tag.
    pub min_width: usize,
    /// Leaves planned concurrently by the position stage.
    pub concurrency: usize,
    /// Copy images beyond a permutation's length unchanged.
    pub carry_extras: bool,
    /// Ancestor directories that form a derived key.
    pub key_depth: usize,
}
impl Default for Context {
    fn default() -> Self {
        Self {
            filter: ImageFilter::default(),
            dry_run: false,
            offset: 2,
            min_width: 2,
            concurrency: default_concurrency(),
            carry_extras: false,
            key_depth: stockshot_catalog::DEFAULT_KEY_DEPTH,
        }
    }
}
impl Context {
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
