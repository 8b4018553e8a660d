//! Image file names in the `<key>.<VARIANT>.<ext>` scheme.

use std::fmt::{Display, Formatter, Result as FmtResult};

use super::{Identifier, Variant};
use crate::consts::{BARE_NAME_REGEX, KEYED_NAME_REGEX};

/// A parsed image file name.
///
/// A name starts out [`Unresolved`](Self::Unresolved) when its key is a
/// product key and becomes [`Resolved`](Self::Resolved) once the key has been
/// replaced by a marketplace identifier. The only transition is
/// [`IdentifierTable::resolve`](crate::IdentifierTable::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageName {
    Unresolved { key: String, variant: Variant, ext: String },
    Resolved { identifier: Identifier, variant: Variant, ext: String },
}
impl ImageName {
    /// Parses `<key>.<VARIANT>.<ext>`.
    ///
    /// Keys that already look like an identifier produce a resolved name.
    /// Returns `None` for anything that doesn't follow the scheme, including
    /// bare `MAIN.<ext>` names, which have no key.
    pub fn parse(file_name: &str) -> Option<Self> {
        let captures = KEYED_NAME_REGEX.captures(file_name)?;
        let key = &captures[1];
        let variant = captures[2].parse().ok()?;
        let ext = captures[3].to_string();
        Some(match key.parse::<Identifier>() {
            Ok(identifier) => Self::Resolved { identifier, variant, ext },
            Err(_) => Self::Unresolved { key: key.to_string(), variant, ext },
        })
    }

    /// Builds an unresolved name for `file_name` under a key derived from
    /// elsewhere, discarding any key the file name already carries.
    ///
    /// The variant comes from either `<key>.<VARIANT>.<ext>` or a bare
    /// `<VARIANT>.<ext>`; `None` when neither matches.
    pub fn rekey(file_name: &str, key: impl Into<String>) -> Option<Self> {
        let captures = KEYED_NAME_REGEX
            .captures(file_name)
            .map(|c| (c.get(2), c.get(3)))
            .or_else(|| BARE_NAME_REGEX.captures(file_name).map(|c| (c.get(1), c.get(2))))?;
        let (Some(variant), Some(ext)) = captures else {
            return None;
        };
        Some(Self::Unresolved {
            key: key.into(),
            variant: variant.as_str().parse().ok()?,
            ext: ext.as_str().to_string(),
        })
    }

    pub fn variant(&self) -> Variant {
        match self {
            Self::Unresolved { variant, .. } | Self::Resolved { variant, .. } => *variant,
        }
    }

    pub fn ext(&self) -> &str {
        match self {
            Self::Unresolved { ext, .. } | Self::Resolved { ext, .. } => ext,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Resolved { identifier, .. } => Some(identifier),
            Self::Unresolved { .. } => None,
        }
    }

    /// The file name this image should carry on disk.
    pub fn file_name(&self) -> String {
        self.to_string()
    }
}
impl Display for ImageName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Unresolved { key, variant, ext } => write!(f, "{key}.{variant}.{ext}"),
            Self::Resolved { identifier, variant, ext } => write!(f, "{identifier}.{variant}.{ext}"),
        }
    }
}
