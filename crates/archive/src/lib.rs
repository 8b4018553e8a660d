//! Size-bounded zip archives.
//!
//! Output trees are split into parts that each stay under a size cap using
//! [first-fit-decreasing](pack) bin packing, then every part is written as a
//! single zip file ([`write_archive`]). Entry names are always `/`-separated
//! paths relative to the packed tree's root.
//!
//! Writing is blocking `std::io`; async callers should hand it to
//! `spawn_blocking`.

mod construct;
pub mod error;
mod pack;
mod util;
mod write;

pub use crate::pack::{Bin, pack};
pub use crate::write::{archive_name, write_archive};

/// Default cap on the summed size of the files in one archive (1 GiB).
pub const DEFAULT_CAP_BYTES: u64 = 1 << 30;

/// How entries are compressed inside an archive.
///
/// Defaults to [`Deflated`](Self::Deflated). Product photos are already
/// compressed, so [`Stored`](Self::Stored) is usually almost as small and
/// much faster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// No compression
    Stored,
    /// Deflate, readable by every unzip tool
    #[default]
    Deflated,
    /// Bzip2
    Bzip2,
}
