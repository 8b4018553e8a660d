//! Packing a finished tree into zip archives.

use crate::error::{ErrorKind, Result};
use crate::{Context, SkipReason, Stage, Summary};
use exn::ResultExt;
use std::path::Path;
use stockshot_archive::error::ErrorKind as ArchiveErrorKind;
use stockshot_archive::{Compression, DEFAULT_CAP_BYTES, archive_name, pack, write_archive};
use stockshot_storage::list_files;
use tracing::instrument;

/// How a tree is split and compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packing {
    /// Largest summed file size per archive.
    pub cap: u64,
    pub compression: Compression,
}
impl Default for Packing {
    fn default() -> Self {
        Self { cap: DEFAULT_CAP_BYTES, compression: Compression::default() }
    }
}

/// Packs every file under `tree` into `<dest>/<name>_part<N>.zip`.
///
/// An archive that already exists is left alone and reported as a
/// collision; the remaining parts are still written. A tree with no files
/// produces no archives.
///
/// # Errors
/// [`ErrorKind::Discovery`] when `tree` can't be walked, and
/// [`ErrorKind::Archive`] when an archive can't be written. Parts written
/// before the failure are kept.
#[instrument(skip_all, fields(tree = %tree.display(), dest = %dest.display(), %name))]
pub async fn run(tree: &Path, dest: &Path, name: &str, packing: Packing, ctx: &Context) -> Result<Summary> {
    let files = list_files(tree).await.or_raise(|| ErrorKind::Discovery)?;
    let mut summary = Summary::new(Stage::Pack).with_output(dest);
    let bins = pack(files, packing.cap);
    tracing::debug!(parts = bins.len(), cap = packing.cap, "Packed tree");
    if !bins.is_empty() && !ctx.dry_run {
        tokio::fs::create_dir_all(dest).await.or_raise(|| ErrorKind::Storage)?;
    }

    for (n, bin) in bins.into_iter().enumerate() {
        let path = dest.join(archive_name(name, n + 1));
        if bin.oversized {
            tracing::warn!(path = %path.display(), size = bin.total, cap = packing.cap, "File exceeds the archive cap; packing it alone");
        }
        if ctx.dry_run {
            summary.planned(tree, &path);
            continue;
        }
        let entries = bin.len();
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || write_archive(&bin, &target, packing.compression))
            .await
            .or_raise(|| ErrorKind::Archive)?;
        match written {
            Ok(bytes) => summary.archived(&path, entries, bytes),
            Err(e) if matches!(&*e, ArchiveErrorKind::AlreadyExists(_)) => {
                summary.skipped(&path, SkipReason::Collision);
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Archive),
        }
    }
    Ok(summary)
}
