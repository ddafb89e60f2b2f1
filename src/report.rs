//! Summaries of listing and extraction runs

use crate::entry::FileType;
use std::path::PathBuf;
use std::time::Duration;

/// Report of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Regular files written
    pub files: usize,
    /// Directories created
    pub directories: usize,
    /// Symbolic links created
    pub symlinks: usize,
    /// Devices, FIFOs, sockets and entries of unknown type
    pub other: usize,
    /// Bytes of entry data handed to the disk writer
    pub bytes_written: u64,
    /// Recoverable problems logged during the run
    pub warnings: usize,
    /// Entries that were not written, by original pathname as displayed
    pub skipped: Vec<String>,
    /// Wall-clock time of the run
    pub duration: Duration,
}

impl ExtractReport {
    pub(crate) fn record(&mut self, file_type: FileType) {
        match file_type {
            FileType::RegularFile => self.files += 1,
            FileType::Directory => self.directories += 1,
            FileType::SymbolicLink => self.symlinks += 1,
            _ => self.other += 1,
        }
    }

    /// Number of entries written to disk
    pub fn entries(&self) -> usize {
        self.files + self.directories + self.symlinks + self.other
    }

    /// Whether any recoverable problem was logged
    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }
}

/// Pathnames of an archive's entries, in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Entry pathnames as stored in the archive
    pub paths: Vec<PathBuf>,
    /// Recoverable problems logged while listing
    pub warnings: usize,
}

impl Listing {
    /// Number of listed entries
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the archive had no entries
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for Listing {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}
