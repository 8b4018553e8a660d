use crate::Compression;
use crate::error::{ErrorKind, Result};
use crate::pack::Bin;
use exn::ResultExt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stockshot_storage::to_posix;
use tracing::instrument;
use zip::write::SimpleFileOptions;

/// The file name of part `part` (counting from 1) of a run's archives.
pub fn archive_name(run_id: &str, part: usize) -> String {
    format!("{run_id}_part{part}.zip")
}

/// Writes `bin` to a new zip file at `dest` and returns the archive size.
///
/// Entries are named by their `/`-separated relative path and carry a fixed
/// timestamp, so the same bin always produces the same bytes.
///
/// # Errors
/// [`ErrorKind::AlreadyExists`] if `dest` exists (nothing is written),
/// [`ErrorKind::Source`] if a packed file can't be read, and
/// [`ErrorKind::Io`] for failures writing the archive itself.
#[instrument(skip_all, fields(dest = %dest.display(), entries = bin.len()))]
pub fn write_archive(bin: &Bin, dest: &Path, compression: Compression) -> Result<u64> {
    let file = match File::create_new(dest) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            exn::bail!(ErrorKind::AlreadyExists(dest.to_path_buf()))
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
    };
    let mut writer = zip::ZipWriter::new(BufWriter::new(file));
    let options = |size: u64| {
        SimpleFileOptions::default()
            .compression_method(compression.into())
            .last_modified_time(zip::DateTime::default())
            .large_file(size >= u64::from(u32::MAX))
    };
    for entry in &bin.entries {
        let mut source = File::open(&entry.path).or_raise(|| ErrorKind::Source(entry.path.clone()))?;
        writer.start_file(to_posix(&entry.relative), options(entry.size)).or_raise(|| ErrorKind::Io)?;
        std::io::copy(&mut source, &mut writer).or_raise(|| ErrorKind::Source(entry.path.clone()))?;
    }
    let mut inner = writer.finish().or_raise(|| ErrorKind::Io)?;
    inner.flush().or_raise(|| ErrorKind::Io)?;
    let size = inner.get_ref().metadata().or_raise(|| ErrorKind::Io)?.len();
    tracing::debug!(size, "Wrote archive");
    Ok(size)
}
