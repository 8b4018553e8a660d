use crate::consts::WHITESPACE_REGEX;
use std::path::{Component, Path};

/// Characters that are not allowed in file names on every target platform.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Makes `name` safe to use as a file name: strips reserved characters,
/// collapses whitespace runs to a single space and trims both ends.
pub fn sanitize(name: impl AsRef<str>) -> String {
    let stripped: String = name.as_ref().chars().filter(|c| !INVALID_CHARS.contains(c)).collect();
    WHITESPACE_REGEX.replace_all(&stripped, " ").trim().to_string()
}

/// Derives a product key from the directories a file sits in.
///
/// `parent` is the file's directory relative to the tree root. Exactly
/// `depth` segments are used: the trailing ones when there are more, padded
/// with empty segments at the end when there are fewer. Segments are joined
/// with spaces and the result [sanitized](sanitize), so padding disappears.
///
/// ```
/// use std::path::Path;
/// use stockshot_catalog::derive_key;
///
/// assert_eq!(derive_key(Path::new("Outer/Brand/Model/Case/Black"), 4), "Brand Model Case Black");
/// assert_eq!(derive_key(Path::new("Brand/Model"), 4), "Brand Model");
/// ```
pub fn derive_key(parent: &Path, depth: usize) -> String {
    let segments: Vec<_> = parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    let start = segments.len().saturating_sub(depth);
    let mut parts: Vec<&str> = segments[start..].iter().map(|s| s.as_ref()).collect();
    parts.resize(depth, "");
    sanitize(parts.join(" "))
}
