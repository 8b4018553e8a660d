mod consts;
pub mod error;
pub mod models;
mod sanitize;
mod table;

pub use crate::models::{Identifier, ImageName, Variant};
pub use crate::sanitize::{derive_key, sanitize};
pub use crate::table::IdentifierTable;

/// Number of trailing ancestor directories that make up a derived key.
pub const DEFAULT_KEY_DEPTH: usize = 4;
