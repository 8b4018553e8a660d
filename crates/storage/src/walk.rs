//! Directory walking.
//!
//! Every listing goes through [`read_listing`], which sorts entries in
//! natural order before anything else sees them. Walks are depth-first with
//! an explicit stack and fail fast: an unreadable directory aborts the whole
//! walk rather than producing a partial result.

use crate::error::{ErrorKind, Result};
use crate::filter::ImageFilter;
use crate::models::{FileEntry, ImageFile, Leaf};
use crate::order::{natural_cmp_file_names, natural_cmp_paths};
use crate::path::relative_to;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// The eligible contents of a single directory.
#[derive(Debug, Default)]
struct Listing {
    files: Vec<PathBuf>,
    subdirs: Vec<PathBuf>,
}

/// Classifies one directory entry. Symlinks and other special files are
/// dropped; hidden entries are dropped unless the filter says otherwise.
async fn process_entry(entry: fs::DirEntry, filter: Option<&ImageFilter>) -> Result<WalkEntry> {
    let path = entry.path();
    let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if filter.is_some_and(|f| f.is_hidden(&name)) {
        return Ok(WalkEntry::Skip);
    }
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if file_type.is_file() && filter.is_none_or(|f| f.is_image(&path)) {
        return Ok(WalkEntry::File(path));
    }
    Ok(WalkEntry::Skip)
}

async fn read_listing(dir: &Path, filter: Option<&ImageFilter>) -> Result<Listing> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| ErrorKind::from_io(e, dir))?;
    let mut listing = Listing::default();
    while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, dir))? {
        match process_entry(entry, filter).await? {
            WalkEntry::File(f) => listing.files.push(f),
            WalkEntry::Descend(d) => listing.subdirs.push(d),
            WalkEntry::Skip => {},
        }
    }
    listing.files.sort_by(|a, b| natural_cmp_file_names(a, b));
    listing.subdirs.sort_by(|a, b| natural_cmp_file_names(a, b));
    Ok(listing)
}

/// Fails with [`ErrorKind::NotADirectory`] unless `root` is an existing directory.
pub async fn ensure_dir(root: &Path) -> Result<()> {
    match fs::metadata(root).await {
        Ok(m) if m.is_dir() => Ok(()),
        Ok(_) => exn::bail!(ErrorKind::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => exn::bail!(ErrorKind::NotADirectory(root.to_path_buf())),
        Err(e) => exn::bail!(ErrorKind::from_io(e, root)),
    }
}

/// Finds every leaf directory under `root`.
///
/// A leaf has no (non-hidden) subdirectories and at least one eligible image.
/// When `root` itself has no subdirectories it is its own leaf, provided it
/// holds an image. Directories with subdirectories are never leaves, even if
/// they contain images themselves; branches with no images anywhere simply
/// produce nothing.
///
/// Leaves are returned in natural order of their root-relative path.
///
/// # Errors
/// [`ErrorKind::NotADirectory`] if `root` is missing or not a directory. Any
/// error while listing a directory aborts the walk.
#[instrument(skip_all, fields(root = %root.display()))]
pub async fn find_leaves(root: &Path, filter: &ImageFilter) -> Result<Vec<PathBuf>> {
    ensure_dir(root).await?;
    let mut leaves = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let listing = read_listing(&current, Some(filter)).await?;
        if !listing.subdirs.is_empty() {
            stack.extend(listing.subdirs);
        } else if !listing.files.is_empty() {
            leaves.push(current);
        }
    }
    leaves.sort_by(|a, b| {
        natural_cmp_paths(a.strip_prefix(root).unwrap_or(a), b.strip_prefix(root).unwrap_or(b))
    });
    tracing::debug!(count = leaves.len(), "Discovered leaf directories");
    Ok(leaves)
}

/// Lists the eligible images directly inside `dir`, in natural order.
pub async fn list_images(dir: &Path, filter: &ImageFilter) -> Result<Vec<PathBuf>> {
    Ok(read_listing(dir, Some(filter)).await?.files)
}

/// Reads a single leaf, assigning each image its discovery index.
pub async fn load_leaf(root: &Path, dir: &Path, filter: &ImageFilter) -> Result<Leaf> {
    let images = list_images(dir, filter)
        .await?
        .into_iter()
        .enumerate()
        .map(|(index, path)| ImageFile::new(path, index))
        .collect();
    Ok(Leaf {
        path: dir.to_path_buf(),
        relative: relative_to(root, dir)?,
        images,
    })
}

/// [`find_leaves`] followed by [`load_leaf`] for each result.
pub async fn discover(root: &Path, filter: &ImageFilter) -> Result<Vec<Leaf>> {
    let mut leaves = Vec::new();
    for dir in find_leaves(root, filter).await? {
        leaves.push(load_leaf(root, &dir, filter).await?);
    }
    Ok(leaves)
}

/// Enumerates every regular file under `root` with its size, regardless of
/// extension or hidden-entry policy, in natural order of relative path.
#[instrument(skip_all, fields(root = %root.display()))]
pub async fn list_files(root: &Path) -> Result<Vec<FileEntry>> {
    ensure_dir(root).await?;
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let listing = read_listing(&current, None).await?;
        for path in listing.files {
            let metadata = fs::metadata(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?;
            let relative = relative_to(root, &path)?;
            files.push(FileEntry::new(path, relative, metadata.len()));
        }
        stack.extend(listing.subdirs);
    }
    files.sort_by(|a, b| natural_cmp_paths(&a.relative, &b.relative));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as sync_fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        sync_fs::create_dir_all(path.parent().unwrap()).unwrap();
        sync_fs::write(path, rel.as_bytes()).unwrap();
    }

    fn relative(root: &Path, leaves: &[PathBuf]) -> Vec<String> {
        leaves.iter().map(|l| crate::to_posix(l.strip_prefix(root).unwrap())).collect()
    }

    #[tokio::test]
    async fn test_finds_leaves_in_natural_order() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(root, "Brand/Model 10/Case/01.jpg");
        touch(root, "Brand/Model 9/Case/01.jpg");
        touch(root, "Brand/Model 9/Wallet/01.png");
        let leaves = find_leaves(root, &ImageFilter::default()).await.unwrap();
        assert_eq!(relative(root, &leaves), vec!["Brand/Model 9/Case", "Brand/Model 9/Wallet", "Brand/Model 10/Case"]);
    }

    #[tokio::test]
    async fn test_excludes_branches_without_images() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(root, "Brand/Empty/Deeper/notes.txt");
        sync_fs::create_dir_all(root.join("Brand/Nothing/At/All")).unwrap();
        touch(root, "Brand/Case/01.jpg");
        let leaves = find_leaves(root, &ImageFilter::default()).await.unwrap();
        assert_eq!(relative(root, &leaves), vec!["Brand/Case"]);
    }

    #[tokio::test]
    async fn test_directories_with_subdirectories_are_not_leaves() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(root, "Case/01.jpg");
        touch(root, "Case/Black/01.jpg");
        let leaves = find_leaves(root, &ImageFilter::default()).await.unwrap();
        assert_eq!(relative(root, &leaves), vec!["Case/Black"]);
    }

    #[tokio::test]
    async fn test_hidden_directories_do_not_count() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(root, "Case/01.jpg");
        touch(root, "Case/.thumbs/01.jpg");
        touch(root, "Case/_old/01.jpg");
        let leaves = find_leaves(root, &ImageFilter::default()).await.unwrap();
        assert_eq!(relative(root, &leaves), vec!["Case"]);
    }

    #[tokio::test]
    async fn test_root_without_subdirectories_is_its_own_leaf() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "01.jpg");
        let leaves = find_leaves(temp.path(), &ImageFilter::default()).await.unwrap();
        assert_eq!(leaves, vec![temp.path().to_path_buf()]);
        let leaf = load_leaf(temp.path(), &leaves[0], &ImageFilter::default()).await.unwrap();
        assert_eq!(leaf.key(), "");
    }

    #[tokio::test]
    async fn test_missing_root_is_not_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("missing");
        let err = find_leaves(&missing, &ImageFilter::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(p) if p == &missing));
        touch(temp.path(), "file.jpg");
        let err = find_leaves(&temp.path().join("file.jpg"), &ImageFilter::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }

    #[tokio::test]
    async fn test_load_leaf_indexes_in_natural_order() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        for name in ["img10.jpg", "img2.jpg", "img1.JPG", "notes.txt", ".DS_Store"] {
            touch(root, &format!("Case/{name}"));
        }
        let leaf = load_leaf(root, &root.join("Case"), &ImageFilter::default()).await.unwrap();
        let names: Vec<_> = leaf.images.iter().map(|i| (i.index, i.name())).collect();
        assert_eq!(
            names,
            vec![(0, "img1.JPG".to_string()), (1, "img2.jpg".to_string()), (2, "img10.jpg".to_string())]
        );
        assert_eq!(leaf.key(), "Case");
    }

    #[tokio::test]
    async fn test_list_files_includes_everything() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(root, "a/PT02.jpg");
        touch(root, "a/.hidden");
        touch(root, "b/notes.txt");
        let files = list_files(root).await.unwrap();
        let rel: Vec<_> = files.iter().map(|f| crate::to_posix(&f.relative)).collect();
        assert_eq!(rel, vec!["a/.hidden", "a/PT02.jpg", "b/notes.txt"]);
        assert_eq!(files[1].size, "a/PT02.jpg".len() as u64);
    }
}
