//! List and extract archives through libarchive
//!
//! The compression filter and the container format are detected by
//! libarchive. Extraction drives an [`ArchiveReader`] and a [`WriteDisk`]
//! together, entry by entry and block by block, restoring timestamps,
//! permissions, ACLs and file flags.
//!
//! Every codec call returns a [`Status`]. Statuses at RETRY or WARN are
//! logged and the run continues; FAILED or FATAL abort it with
//! [`Error::Aborted`].
//!
//! # Examples
//!
//! ## Listing an archive
//!
//! ```no_run
//! use std::path::Path;
//!
//! let listing = archive_extract::list(Path::new("archive.tar.gz"))?;
//! for path in listing {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), archive_extract::Error>(())
//! ```
//!
//! ## Extracting an archive
//!
//! ```no_run
//! use archive_extract::{ExtractOptions, Extractor, PathPolicy};
//! use std::path::Path;
//!
//! let options = ExtractOptions::new().path_policy(PathPolicy::Contained);
//! let report = Extractor::new(options)
//!     .extract(Path::new("archive.tar.gz"), Some(Path::new("/tmp/out")))?;
//! println!("extracted {} entries", report.entries());
//! # Ok::<(), archive_extract::Error>(())
//! ```

#![deny(missing_docs)]

mod backend;
mod config;
mod engine;
mod entry;
mod error;
mod extract;
mod list;
mod path;
mod reader;
mod report;
mod status;

#[cfg(test)]
mod test_utils;

pub use backend::{
    Backend, Block, DataBlock, DiskSession, EntryView, Header, Libarchive, ReadSession,
};
pub use config::{DEFAULT_BLOCK_SIZE, ExtractOptions, PathPolicy};
pub use engine::Extractor;
pub use entry::{Entry, FileType};
pub use error::{Error, Result};
pub use extract::{ExtractFlags, WriteDisk};
pub use list::Lister;
pub use path::{UnsafePath, default_destination, destination_path};
pub use reader::ArchiveReader;
pub use report::{ExtractReport, Listing};
pub use status::{Code, Severity, Status};

/// List the entries of `source` with libarchive and default options
pub fn list(source: &std::path::Path) -> Result<Listing> {
    Lister::new().list(source)
}

/// Extract `source` under `destination` with libarchive and default options
///
/// Without a destination, entries are extracted next to the archive.
pub fn extract(
    source: &std::path::Path,
    destination: Option<&std::path::Path>,
) -> Result<ExtractReport> {
    Extractor::new(ExtractOptions::default()).extract(source, destination)
}

/// Returns the version string of the underlying libarchive library
pub fn libarchive_version() -> String {
    unsafe {
        let ptr = libarchive2_sys::archive_version_string();
        std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Returns detailed version information including linked libraries
pub fn libarchive_version_details() -> String {
    unsafe {
        let ptr = libarchive2_sys::archive_version_details();
        std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}
