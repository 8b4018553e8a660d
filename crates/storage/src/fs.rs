//! Non-clobbering file operations.
//!
//! None of these ever replace an existing target. A collision surfaces as
//! [`ErrorKind::AlreadyExists`], which callers treat as a per-file skip
//! rather than a failure.

use crate::error::{ErrorKind, Result};
use std::path::Path;
use tokio::fs;

async fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.map_err(|e| ErrorKind::from_io(e, parent))?;
    }
    Ok(())
}

/// Copies `src` to `dst`, creating parent directories as needed.
///
/// The copy keeps the source's permissions and modification time. The
/// destination is opened with `create_new`, so an existing file is detected
/// atomically instead of being truncated.
pub async fn copy_new(src: &Path, dst: &Path) -> Result<u64> {
    create_parent(dst).await?;
    let metadata = fs::metadata(src).await.map_err(|e| ErrorKind::from_io(e, src))?;
    let mut reader = fs::File::open(src).await.map_err(|e| ErrorKind::from_io(e, src))?;
    let mut writer = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .await
        .map_err(|e| ErrorKind::from_io(e, dst))?;
    let bytes = tokio::io::copy(&mut reader, &mut writer).await.map_err(|e| ErrorKind::from_io(e, dst))?;
    let writer = writer.into_std().await;
    if let Ok(modified) = metadata.modified() {
        writer.set_modified(modified).map_err(|e| ErrorKind::from_io(e, dst))?;
    }
    drop(writer);
    fs::set_permissions(dst, metadata.permissions()).await.map_err(|e| ErrorKind::from_io(e, dst))?;
    Ok(bytes)
}

/// Renames `from` to `to` unless `to` already exists.
///
/// Renaming a file onto itself is a no-op. The existence check and the
/// rename are two steps; this is only safe because a run owns the tree it
/// renames in.
pub async fn rename_new(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if fs::try_exists(to).await.map_err(|e| ErrorKind::from_io(e, to))? {
        exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
    }
    create_parent(to).await?;
    Ok(fs::rename(from, to).await.map_err(|e| ErrorKind::from_io(e, to))?)
}

/// Creates `dir` (and its parents), failing if `dir` itself already exists.
pub async fn create_dir_new(dir: &Path) -> Result<()> {
    create_parent(dir).await?;
    Ok(fs::create_dir(dir).await.map_err(|e| ErrorKind::from_io(e, dir))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[tokio::test]
    async fn test_copy_creates_directories_and_keeps_mtime() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src.jpg");
        std::fs::write(&src, b"pixels").unwrap();
        let past = SystemTime::now() - Duration::from_secs(86_400);
        std::fs::File::options().write(true).open(&src).unwrap().set_modified(past).unwrap();

        let dst = temp.path().join("out/Brand/Black/src.jpg");
        assert_eq!(copy_new(&src, &dst).await.unwrap(), 6);
        assert_eq!(std::fs::read(&dst).unwrap(), b"pixels");
        let copied = std::fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(copied, std::fs::metadata(&src).unwrap().modified().unwrap());
    }

    #[tokio::test]
    async fn test_copy_never_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src.jpg");
        let dst = temp.path().join("dst.jpg");
        std::fs::write(&src, b"new").unwrap();
        std::fs::write(&dst, b"old").unwrap();
        let err = copy_new(&src, &dst).await.unwrap_err();
        assert!(err.is_collision());
        assert_eq!(std::fs::read(&dst).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let temp = tempfile::tempdir().unwrap();
        let err = copy_new(&temp.path().join("nope.jpg"), &temp.path().join("dst.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_never_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let from = temp.path().join("a.jpg");
        let to = temp.path().join("b.jpg");
        std::fs::write(&from, b"a").unwrap();
        std::fs::write(&to, b"b").unwrap();
        let err = rename_new(&from, &to).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(p) if p == &to));
        assert!(from.exists());

        std::fs::remove_file(&to).unwrap();
        rename_new(&from, &to).await.unwrap();
        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"a");
    }

    #[tokio::test]
    async fn test_rename_onto_itself() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("MAIN.jpg");
        std::fs::write(&path, b"a").unwrap();
        rename_new(&path, &path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_create_dir_new() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("Outputs/20250101-120000");
        create_dir_new(&dir).await.unwrap();
        assert!(dir.is_dir());
        let err = create_dir_new(&dir).await.unwrap_err();
        assert!(err.is_collision());
    }
}
