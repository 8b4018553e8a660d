//! Front image placement.
//!
//! Main images are supplied separately, one per colour, laid out as
//! `<leaf>/<colour>.jpg`. Each one is copied into the matching colour folder
//! of an existing tree as `MAIN.jpg`:
//!
//! ```text
//! Fronts/Google/Pixel 9a/VintageWallet/Brown.jpg
//!     -> Tree/Google/Pixel 9a/VintageWallet/Brown/MAIN.jpg
//! ```

use crate::error::{ErrorKind, Result};
use crate::{Context, SkipReason, Stage, Summary};
use exn::ResultExt;
use std::path::{Component, Path};
use stockshot_storage::{copy_new, ensure_dir, list_files, to_posix};
use tracing::instrument;

/// Name every front image is given in its colour folder.
pub const MAIN_FILE_NAME: &str = "MAIN.jpg";

/// Places every `<colour>.jpg` under `fronts` into `root` as `MAIN.jpg`.
///
/// Only `.jpg` files (any case) are considered. The colour folder must
/// already exist; the placement is skipped otherwise. An existing `MAIN.jpg`
/// is never replaced.
///
/// # Errors
/// [`ErrorKind::Discovery`] when either directory is missing or can't be
/// walked.
#[instrument(skip_all, fields(fronts = %fronts.display(), root = %root.display()))]
pub async fn run(fronts: &Path, root: &Path, ctx: &Context) -> Result<Summary> {
    ensure_dir(root).await.or_raise(|| ErrorKind::Discovery)?;
    let files = list_files(fronts).await.or_raise(|| ErrorKind::Discovery)?;
    let mut summary = Summary::new(Stage::Front);

    for file in files {
        let hidden = file.relative.components().any(|c| match c {
            Component::Normal(s) => ctx.filter.is_hidden(&s.to_string_lossy()),
            _ => false,
        });
        let is_jpg = file.path.extension().is_some_and(|e| e.eq_ignore_ascii_case("jpg"));
        if hidden || !is_jpg {
            continue;
        }
        let Some(colour) = file.path.file_stem().map(|s| s.to_string_lossy().trim().to_string()) else {
            continue;
        };
        let parent = file.relative.parent().unwrap_or(Path::new(""));
        let dir = root.join(parent).join(&colour);
        if colour.is_empty() || !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            summary.skipped(&file.path, SkipReason::NoTarget);
            continue;
        }
        let to = dir.join(MAIN_FILE_NAME);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{touch, tree};

    #[tokio::test]
    async fn test_places_fronts_in_colour_folders() {
        let temp = tempfile::tempdir().unwrap();
        let fronts = temp.path().join("fronts");
        let root = temp.path().join("tree");
        touch(&root, "Brand/Case/Black/PT02.jpg");
        touch(&root, "Brand/Case/Brown/PT02.jpg");
        touch(&root, "Brand/Case/Brown/MAIN.jpg");
        touch(&fronts, "Brand/Case/Black.JPG");
        touch(&fronts, "Brand/Case/Brown.jpg");
        touch(&fronts, "Brand/Case/Navy.jpg");
        touch(&fronts, "Brand/Case/Black.png");
        touch(&fronts, "Brand/Case/.Black.jpg");

        let summary = run(&fronts, &root, &Context::default()).await.unwrap();

        assert_eq!(summary.copied_count(), 1);
        assert_eq!(summary.skipped_for(&SkipReason::NoTarget), 1);
        assert_eq!(summary.skipped_for(&SkipReason::Collision), 1);
        assert_eq!(
            tree(&root),
            vec![
                "Brand/Case/Black/MAIN.jpg",
                "Brand/Case/Black/PT02.jpg",
                "Brand/Case/Brown/MAIN.jpg",
                "Brand/Case/Brown/PT02.jpg",
            ]
        );
        assert_eq!(std::fs::read(root.join("Brand/Case/Black/MAIN.jpg")).unwrap(), b"Brand/Case/Black.JPG");
        assert_eq!(std::fs::read(root.join("Brand/Case/Brown/MAIN.jpg")).unwrap(), b"Brand/Case/Brown/MAIN.jpg");
    }

    #[tokio::test]
    async fn test_missing_directories_abort() {
        let temp = tempfile::tempdir().unwrap();
        let err = run(&temp.path().join("fronts"), temp.path(), &Context::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery));
        let err = run(temp.path(), &temp.path().join("tree"), &Context::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery));
    }
}
