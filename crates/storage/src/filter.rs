use std::collections::BTreeSet;
use std::path::Path;

/// Extensions considered images unless configured otherwise.
pub const DEFAULT_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];

/// Decides which directory entries take part in a run.
///
/// Extensions are matched case-insensitively and stored without the leading
/// dot. Entries whose name starts with `.` or `_` are hidden and skipped
/// unless `include_hidden` is set; this applies to directories as well, so a
/// hidden directory is neither descended into nor counted as a subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFilter {
    extensions: BTreeSet<String>,
    include_hidden: bool,
}
impl Default for ImageFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS, false)
    }
}
impl ImageFilter {
    pub fn new<I, S>(extensions: I, include_hidden: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions, include_hidden }
    }

    /// Adds `gif` to the eligible extensions.
    pub fn with_gif(mut self) -> Self {
        self.extensions.insert("gif".to_string());
        self
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Whether an entry name should be skipped under the hidden-entry policy.
    pub fn is_hidden(&self, name: &str) -> bool {
        !self.include_hidden && (name.starts_with('.') || name.starts_with('_'))
    }

    /// Whether `path` names an eligible image (by name only; no I/O).
    pub fn is_image(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.is_hidden(name) {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}
