use crate::Context;
use crate::plan::Permutation;
use crate::position::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use stockshot_storage::{Leaf, load_leaf, to_posix};

/// One image and the name it gets in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub source: PathBuf,
    pub target: String,
    /// The image already carries its target name.
    pub noop: bool,
}

/// Everything the apply step needs for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafPlan {
    /// Path relative to the tree root; mirrored under the output root.
    pub relative: PathBuf,
    pub entries: Vec<PlanEntry>,
    /// Images past the end of the permutation, kept under their own names.
    /// Only populated when extras are carried.
    pub extras: Vec<PlanEntry>,
}
impl LeafPlan {
    pub fn key(&self) -> String {
        to_posix(&self.relative)
    }

    pub fn noops(&self) -> usize {
        self.entries.iter().filter(|e| e.noop).count()
    }
}

/// `PT` followed by the zero-padded position and the lower-cased extension.
pub fn target_name(position: usize, offset: u32, width: usize, extension: Option<&str>) -> String {
    let tag = position as u64 + u64::from(offset);
    match extension {
        Some(ext) => format!("PT{tag:0width$}.{}", ext.to_lowercase()),
        None => format!("PT{tag:0width$}"),
    }
}

/// Plans the renames for a loaded leaf.
pub fn plan_images(leaf: &Leaf, permutation: &Permutation, ctx: &Context) -> Result<LeafPlan> {
    let needed = permutation.len();
    if leaf.len() < needed {
        exn::bail!(ErrorKind::TooFewImages { found: leaf.len(), needed });
    }
    let width = permutation.width(ctx.offset, ctx.min_width);
    let (covered, rest) = leaf.images.split_at(needed);

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(needed);
    for (image, position) in covered.iter().zip(permutation.iter()) {
        let target = target_name(position, ctx.offset, width, image.extension());
        if !seen.insert(target.clone()) {
            exn::bail!(ErrorKind::DuplicateTarget(target));
        }
        entries.push(PlanEntry { noop: image.name() == target, source: image.path.clone(), target });
    }

    let extras = match ctx.carry_extras {
        true => rest
            .iter()
            .map(|image| PlanEntry { source: image.path.clone(), target: image.name(), noop: true })
            .collect(),
        false => Vec::new(),
    };
    if !rest.is_empty() && !ctx.carry_extras {
        tracing::debug!(leaf = %leaf.key(), dropped = rest.len(), "Images beyond the permutation are not written");
    }
    Ok(LeafPlan { relative: leaf.relative.clone(), entries, extras })
}

/// Reads the leaf at `dir` and plans it. Read-only.
pub async fn plan_leaf(root: &Path, dir: &Path, permutation: &Permutation, ctx: &Context) -> Result<LeafPlan> {
    let leaf = load_leaf(root, dir, &ctx.filter).await.or_raise(|| ErrorKind::Storage)?;
    plan_images(&leaf, permutation, ctx)
}
