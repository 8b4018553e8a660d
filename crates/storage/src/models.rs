//! Discovery models.
//!
//! These types are produced by the [walker](crate::find_leaves) and handed to
//! the pipeline stages. A [`Leaf`] owns its images; nothing here is shared
//! between leaves.

use crate::path::to_posix;
use std::path::{Path, PathBuf};

/// An eligible image inside a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Absolute path of the source image
    pub path: PathBuf,
    /// Position within the leaf at discovery time (natural order); never
    /// changes afterwards.
    pub index: usize,
    /// Colour bucket assigned by the colour stage
    pub colour: Option<String>,
    /// Set when the image is duplicated into every colour bucket instead of
    /// taking part in round-robin assignment.
    pub clone: bool,
}
impl ImageFile {
    pub fn new(path: impl Into<PathBuf>, index: usize) -> Self {
        Self { path: path.into(), index, colour: None, clone: false }
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }

    pub fn as_clone(mut self) -> Self {
        self.clone = true;
        self
    }

    /// The file name as UTF-8 (lossy).
    pub fn name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// The extension without the leading dot, as found on disk.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// A terminal directory with at least one eligible image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Absolute path of the directory
    pub path: PathBuf,
    /// Path relative to the root the leaf was discovered under (empty when
    /// the root itself is the leaf)
    pub relative: PathBuf,
    /// Images in natural order of their file names
    pub images: Vec<ImageFile>,
}
impl Leaf {
    /// The POSIX form of [`relative`](Self::relative), used as a plan key.
    pub fn key(&self) -> String {
        to_posix(&self.relative)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// A regular file found while enumerating a whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the enumerated root
    pub relative: PathBuf,
    /// File size in bytes
    pub size: u64,
}
impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, relative: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), relative: relative.into(), size }
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }
}
