//! Stage inputs supplied by the operator (or a front end standing in for one).
//!
//! Plans are plain JSON:
//!
//! ```json
//! { "colours": { "Google/Pixel 9a/VintageWallet": ["Black", "Brown"] },
//!   "clones":  { "Google/Pixel 9a/VintageWallet": "IMG_0009.jpg" } }
//! ```
//!
//! ```json
//! { "Google/Pixel 9a/VintageWallet": [0, 5, 4, 2, 3, 1] }
//! ```
//!
//! Keys are root-relative POSIX paths. They are normalized with
//! [`normalize_key`] before use; a key that would escape the root is an
//! input error for that entry only.

use crate::error::{ErrorKind, Result};
use derive_more::{Display, Error};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path};
use stockshot_storage::{to_posix, validate_path};

/// Colour sequences (and optional clone images) per leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourPlan {
    #[serde(default)]
    pub colours: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub clones: BTreeMap<String, String>,
}
impl ColourPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).or_raise(|| ErrorKind::Plan)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        Self::from_json(&read(path).await?)
    }
}

/// Permutations per base folder: `plan[base][original_index] = new_position`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderPlan(pub BTreeMap<String, Vec<i64>>);
impl OrderPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).or_raise(|| ErrorKind::Plan)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        Self::from_json(&read(path).await?)
    }
}
impl<K: Into<String>> FromIterator<(K, Vec<i64>)> for OrderPlan {
    fn from_iter<T: IntoIterator<Item = (K, Vec<i64>)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.or_raise(|| ErrorKind::Plan)
}

/// Problems with a single plan entry.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[display("path escapes the tree root: {_0}")]
    EscapesRoot(#[error(not(source))] String),
    #[display("permutation is empty")]
    EmptyPermutation,
    #[display("permutation value {value} at index {index} is outside 0..{len}")]
    OutOfRange { index: usize, value: i64, len: usize },
    #[display("permutation maps two images to position {_0}")]
    Repeated(#[error(not(source))] i64),
}

/// Normalizes a root-relative plan key to its POSIX form. Blank keys, `.` and
/// `/` all name the root itself and normalize to the empty string.
pub fn normalize_key(key: &str) -> std::result::Result<String, PlanError> {
    let trimmed = key.trim();
    if Path::new(trimmed).components().all(|c| matches!(c, Component::RootDir | Component::CurDir)) {
        return Ok(String::new());
    }
    validate_path(trimmed).map(to_posix).map_err(|_| PlanError::EscapesRoot(key.to_string()))
}

/// Trims colour names, drops blanks, repeats and names that can't be a
/// single directory component, keeping the first occurrence of each.
pub fn clean_colours<S: AsRef<str>>(colours: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    colours
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| {
            let single = matches!(Path::new(c).components().collect::<Vec<_>>().as_slice(), [Component::Normal(n)] if n.len() == c.len());
            if !c.is_empty() && !single {
                tracing::warn!(colour = c, "Ignoring colour that is not a plain folder name");
            }
            single
        })
        .filter(|c| seen.insert(c.to_string()))
        .map(str::to_string)
        .collect()
}

/// A bijection over `0..len`, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);
impl Permutation {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The new position of the image at `index`.
    pub fn target(&self, index: usize) -> usize {
        self.0[index]
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &t)| i == t)
    }

    /// Digits needed for the largest position tag, never fewer than `min_width`.
    pub fn width(&self, offset: u32, min_width: usize) -> usize {
        let largest = self.0.iter().max().copied().unwrap_or_default() as u64 + u64::from(offset);
        largest.to_string().len().max(min_width)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}
impl TryFrom<&[i64]> for Permutation {
    type Error = PlanError;
    fn try_from(values: &[i64]) -> std::result::Result<Self, Self::Error> {
        if values.is_empty() {
            return Err(PlanError::EmptyPermutation);
        }
        let len = values.len();
        let mut seen = vec![false; len];
        let mut targets = Vec::with_capacity(len);
        for (index, &value) in values.iter().enumerate() {
            let target = usize::try_from(value)
                .ok()
                .filter(|t| *t < len)
                .ok_or(PlanError::OutOfRange { index, value, len })?;
            if std::mem::replace(&mut seen[target], true) {
                return Err(PlanError::Repeated(value));
            }
            targets.push(target);
        }
        Ok(Self(targets))
    }
}
