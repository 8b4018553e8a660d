use std::cmp::Reverse;
use stockshot_storage::{FileEntry, natural_cmp_paths};

/// A group of files destined for one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bin {
    pub entries: Vec<FileEntry>,
    /// Summed size of [`entries`](Self::entries) in bytes
    pub total: u64,
    /// Set when the bin holds a single file larger than the cap
    pub oversized: bool,
}
impl Bin {
    fn fits(&self, size: u64, cap: u64) -> bool {
        !self.oversized && self.total.saturating_add(size) <= cap
    }

    fn push(&mut self, entry: FileEntry) {
        self.total += entry.size;
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Groups files into bins whose summed size stays within `cap`, using
/// first-fit-decreasing.
///
/// Files are taken largest first (ties in natural order of relative path)
/// and placed into the first bin with room, opening a new bin when none has.
/// A file larger than `cap` gets a bin of its own, marked
/// [`oversized`](Bin::oversized), that nothing else is added to.
pub fn pack(mut files: Vec<FileEntry>, cap: u64) -> Vec<Bin> {
    files.sort_by(|a, b| Reverse(a.size).cmp(&Reverse(b.size)).then_with(|| natural_cmp_paths(&a.relative, &b.relative)));
    let mut bins: Vec<Bin> = Vec::new();
    for file in files {
        if file.size > cap {
            tracing::warn!(path = %file.path.display(), size = file.size, cap, "File exceeds archive cap; packing alone");
            let mut bin = Bin { oversized: true, ..Bin::default() };
            bin.push(file);
            bins.push(bin);
            continue;
        }
        match bins.iter_mut().find(|bin| bin.fits(file.size, cap)) {
            Some(bin) => bin.push(file),
            None => {
                let mut bin = Bin::default();
                bin.push(file);
                bins.push(bin);
            },
        }
    }
    bins
}
