pub mod error;
mod filter;
mod fs;
mod models;
mod order;
mod path;
mod walk;

pub use crate::filter::{DEFAULT_EXTENSIONS, ImageFilter};
pub use crate::fs::{copy_new, create_dir_new, rename_new};
pub use crate::models::{FileEntry, ImageFile, Leaf};
pub use crate::order::{natural_cmp, natural_cmp_paths};
pub use crate::path::{relative_to, to_posix, validate as validate_path};
pub use crate::walk::{discover, ensure_dir, find_leaves, list_files, list_images, load_leaf};
