//! Path validation and conversion utilities.
//!
//! Plan keys (leaf and base folders) arrive as root-relative POSIX strings
//! from an external collaborator. Everything here makes sure they can never
//! point outside the tree they are resolved against.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Component, Path, PathBuf};

/// Validates a root-relative path and returns its normalized form.
/// Ensures that paths don't escape the root (no `..` traversal).
///
/// > **Note:** Null bytes are explicitly rejected. An empty path (or one that
/// >           normalizes to empty, like `./`) is invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use stockshot_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("Google/Pixel 9a/VintageWallet").is_ok());
/// assert!(validate_path("a/../Brown").is_ok()); // (never leaves root)
/// // Invalid paths
/// assert!(validate_path("../Outputs").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("/Google//./Pixel 9a/VintageWallet/").unwrap(),
///     Path::new("Google/Pixel 9a/VintageWallet")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            // Keys are always root-relative, a leading slash is just noise.
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Renders a relative path with `/` separators regardless of platform. This
/// is the form used for plan keys, log fields and archive entry names.
pub fn to_posix(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns `path` relative to `root`. An empty path is returned when both are
/// the same directory.
pub fn relative_to(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<PathBuf> {
    let (root, path) = (root.as_ref(), path.as_ref());
    let relative = path.strip_prefix(root).or_raise(|| ErrorKind::InvalidPath(path.to_path_buf()))?;
    Ok(relative.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Google/Pixel 9a/VintageWallet", "Google/Pixel 9a/VintageWallet")]
    #[case("a//b//c", "a/b/c")]
    #[case("a/./b/./c", "a/b/c")]
    #[case("/Brand/Model", "Brand/Model")]
    #[case("Brand/Model/", "Brand/Model")]
    #[case("a/b/..", "a")]
    fn test_valid_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("..")]
    #[case("")]
    #[case(".")]
    #[case("./.")]
    #[case("//")]
    #[case("a\0b")]
    fn test_invalid_paths(#[case] input: &str) {
        assert!(validate(input).is_err());
    }

    #[test]
    fn test_to_posix() {
        let path: PathBuf = ["Google", "Pixel 9a", "VintageWallet"].iter().collect();
        assert_eq!(to_posix(&path), "Google/Pixel 9a/VintageWallet");
        assert_eq!(to_posix(""), "");
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/data/Inputs");
        assert_eq!(relative_to(root, "/data/Inputs/Brand/Case").unwrap(), Path::new("Brand/Case"));
        assert_eq!(relative_to(root, root).unwrap(), Path::new(""));
        assert!(relative_to(root, "/elsewhere/Brand").is_err());
    }
}
