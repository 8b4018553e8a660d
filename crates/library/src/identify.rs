//! Identifier resolution.
//!
//! Product images end up named `<identifier>.<VARIANT>.<ext>`, where the
//! identifier comes from an [`IdentifierTable`] keyed by SKU. There are two
//! ways to get there:
//!
//! - [`rename`] works in place on files already named `<key>.<VARIANT>.<ext>`
//!   and swaps the key for its identifier.
//! - [`copy`] derives the key from the folders an image sits in (see
//!   [`derive_key`]), takes the variant from the file name and copies the
//!   result into a fresh output root.
//!
//! A key the table doesn't know is never an error. The file is left alone
//! and counted as unresolved.

use crate::error::{ErrorKind, Result};
use crate::output::create_output_root;
use crate::{Context, SkipReason, Stage, Summary};
use exn::ResultExt;
use std::path::{Component, Path};
use stockshot_catalog::{IdentifierTable, ImageName, derive_key};
use stockshot_storage::{FileEntry, ImageFilter, copy_new, list_files, rename_new, to_posix};
use tracing::instrument;

/// Whether a file takes part at all. Hidden files (or files in hidden
/// folders) and non-images are ignored without being reported.
fn eligible(file: &FileEntry, filter: &ImageFilter) -> bool {
    let hidden = file.relative.components().any(|c| match c {
        Component::Normal(s) => filter.is_hidden(&s.to_string_lossy()),
        _ => false,
    });
    !hidden && filter.is_image(&file.path)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Renames keyed images under `root` in place.
///
/// Names that already carry an identifier are skipped, as are names with no
/// variant tag. A target that already exists is a collision and the source
/// keeps its name.
///
/// # Errors
/// [`ErrorKind::Discovery`] when `root` can't be walked.
#[instrument(skip_all, fields(root = %root.display(), entries = table.len()))]
pub async fn rename(root: &Path, table: &IdentifierTable, ctx: &Context) -> Result<Summary> {
    let files = list_files(root).await.or_raise(|| ErrorKind::Discovery)?;
    let mut summary = Summary::new(Stage::Rekey);
    for file in files.iter().filter(|f| eligible(f, &ctx.filter)) {
        let Some(name) = ImageName::parse(&file_name(&file.path)) else {
            summary.skipped(&file.path, SkipReason::Unparsed);
            continue;
        };
        if name.is_resolved() {
            summary.skipped(&file.path, SkipReason::AlreadyIdentified);
            continue;
        }
        let name = table.resolve(name);
        if !name.is_resolved() {
            summary.skipped(&file.path, SkipReason::Unresolved);
            continue;
        }
        let to = file.path.with_file_name(name.file_name());
        if ctx.dry_run {
            summary.planned(&file.path, &to);
            continue;
        }
        match rename_new(&file.path, &to).await {
            Ok(()) => summary.renamed(&file.path, &to),
            Err(e) if e.is_collision() => summary.skipped(&to, SkipReason::Collision),
            Err(e) => summary.failed(to_posix(&file.relative), &*e),
        }
    }
    Ok(summary)
}

/// Copies every image under `root` into `output` under its identifier.
///
/// The key is derived from the `ctx.key_depth` folders above the image and
/// the variant from its file name, either `<anything>.<VARIANT>.<ext>` or a
/// bare `<VARIANT>.<ext>`. The output mirrors the input folders.
///
/// # Errors
/// [`ErrorKind::Discovery`] when `root` can't be walked and
/// [`ErrorKind::OutputExists`] when `output` already exists.
#[instrument(skip_all, fields(root = %root.display(), output = %output.display(), entries = table.len()))]
pub async fn copy(root: &Path, table: &IdentifierTable, output: &Path, ctx: &Context) -> Result<Summary> {
    let files = list_files(root).await.or_raise(|| ErrorKind::Discovery)?;
    let mut summary = Summary::new(Stage::Identify).with_output(output);
    create_output_root(output, ctx.dry_run).await?;
    for file in files.iter().filter(|f| eligible(f, &ctx.filter)) {
        let parent = file.relative.parent().unwrap_or(Path::new(""));
        let key = derive_key(parent, ctx.key_depth);
        if key.is_empty() {
            summary.skipped(&file.path, SkipReason::EmptyKey);
            continue;
        }
        let Some(name) = ImageName::rekey(&file_name(&file.path), key) else {
            summary.skipped(&file.path, SkipReason::Unparsed);
            continue;
        };
        let name = table.resolve(name);
        if !name.is_resolved() {
            summary.skipped(&file.path, SkipReason::Unresolved);
            continue;
        }
        let to = output.join(parent).join(name.file_name());
        if ctx.dry_run {
            summary.planned(&file.path, &to);
            continue;
        }
        match copy_new(&file.path, &to).await {
            Ok(_) => summary.copied(&file.path, &to),
            Err(e) if e.is_collision() => summary.skipped(&to, SkipReason::Collision),
            Err(e) => summary.failed(to_posix(&file.relative), &*e),
        }
    }
    Ok(summary)
}
