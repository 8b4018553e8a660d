//! Positional renaming.
//!
//! An [`OrderPlan`] maps base folders to permutations. Every leaf under a
//! base has its first `n` images (natural order) renamed to `PT` position
//! tags through the permutation and copied into a fresh output root:
//!
//! ```text
//! permutation [0, 5, 4, 2, 3, 1], offset 2
//!
//! 01.jpg -> PT02.jpg    04.jpg -> PT04.jpg
//! 02.jpg -> PT07.jpg    05.jpg -> PT05.jpg
//! 03.jpg -> PT06.jpg    06.jpg -> PT03.jpg
//! ```
//!
//! Planning is read-only and runs for several leaves at once (bounded by
//! [`Context::concurrency`]). Nothing is written until every leaf has been
//! planned; the copies are then made one leaf at a time.

pub mod error;
mod leaf;

pub use self::leaf::{LeafPlan, PlanEntry, plan_images, plan_leaf, target_name};

use crate::error::{ErrorKind, Result};
use crate::output::create_output_root;
use crate::plan::{OrderPlan, Permutation, normalize_key};
use crate::{Context, SkipReason, Stage, Summary};
use exn::ResultExt;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::path::{Path, PathBuf};
use stockshot_storage::{copy_new, ensure_dir, find_leaves, natural_cmp, relative_to, to_posix};
use tracing::instrument;

/// A leaf waiting to be planned.
struct Job {
    key: String,
    dir: PathBuf,
    permutation: Permutation,
}

/// Runs the position stage for every base in `plan`, writing into `output`.
///
/// Bases are handled in natural order. A base whose key escapes the root,
/// whose permutation isn't a bijection, or that can't be walked is recorded
/// as failed; so is any leaf that can't be planned. Other bases and leaves
/// are unaffected.
///
/// # Errors
/// [`ErrorKind::Discovery`] when `root` is not a directory and
/// [`ErrorKind::OutputExists`] when `output` already exists.
#[instrument(skip_all, fields(root = %root.display(), output = %output.display()))]
pub async fn run(root: &Path, plan: &OrderPlan, output: &Path, ctx: &Context) -> Result<Summary> {
    ensure_dir(root).await.or_raise(|| ErrorKind::Discovery)?;
    let mut summary = Summary::new(Stage::Position).with_output(output);

    let mut bases: Vec<_> = plan.0.iter().collect();
    bases.sort_by(|a, b| natural_cmp(a.0, b.0));
    let mut jobs = Vec::new();
    for (key, values) in bases {
        let base = match normalize_key(key) {
            Ok(base) => base,
            Err(e) => {
                summary.failed(key.clone(), e);
                continue;
            },
        };
        let permutation = match Permutation::try_from(values.as_slice()) {
            Ok(p) => p,
            Err(e) => {
                summary.failed(base, e);
                continue;
            },
        };
        let dirs = match find_leaves(&root.join(&base), &ctx.filter).await {
            Ok(dirs) => dirs,
            Err(e) => {
                summary.failed(base, &*e);
                continue;
            },
        };
        if dirs.is_empty() {
            tracing::warn!(%base, "No leaves under base");
        }
        for dir in dirs {
            let key = relative_to(root, &dir).map(to_posix).unwrap_or_else(|_| dir.display().to_string());
            jobs.push(Job { key, dir, permutation: permutation.clone() });
        }
    }

    let plans = plan_all(root, jobs, ctx).await;
    create_output_root(output, ctx.dry_run).await?;
    for (key, plan) in plans {
        match plan {
            Ok(plan) => apply(&plan, output, ctx, &mut summary).await,
            Err(e) => summary.failed(key, &*e),
        }
    }
    Ok(summary)
}

/// Plans every job, at most `ctx.concurrency` at a time. Results come back
/// in job order regardless of completion order.
async fn plan_all(root: &Path, jobs: Vec<Job>, ctx: &Context) -> Vec<(String, error::Result<LeafPlan>)> {
    let mut futures: Vec<_> = jobs
        .into_iter()
        .enumerate()
        .map(|(n, job)| async move {
            let plan = plan_leaf(root, &job.dir, &job.permutation, ctx).await;
            (n, job.key, plan)
        })
        .collect();
    let mut processing = FuturesUnordered::new();
    processing.extend(futures.drain(..ctx.concurrency.max(1).min(futures.len())));
    let mut results = Vec::with_capacity(futures.len() + processing.len());
    while let Some(result) = processing.next().await {
        results.push(result);
        // Pop-n-push, FIFO.
        if !futures.is_empty() {
            processing.push(futures.remove(0));
        }
    }
    results.sort_by_key(|(n, ..)| *n);
    results.into_iter().map(|(_, key, plan)| (key, plan)).collect()
}

#[instrument(skip_all, fields(leaf = %plan.key()))]
async fn apply(plan: &LeafPlan, output: &Path, ctx: &Context, summary: &mut Summary) {
    if plan.noops() == plan.entries.len() {
        tracing::debug!("Every image already carries its position tag");
    }
    let target = output.join(&plan.relative);
    for entry in plan.entries.iter().chain(&plan.extras) {
        let to = target.join(&entry.target);
        if ctx.dry_run {
            summary.planned(&entry.source, &to);
            continue;
        }
        match copy_new(&entry.source, &to).await {
            Ok(_) => summary.copied(&entry.source, &to),
            Err(e) if e.is_collision() => summary.skipped(&to, SkipReason::Collision),
            Err(e) => {
                summary.failed(plan.key(), &*e);
                return;
            },
        }
    }
}
