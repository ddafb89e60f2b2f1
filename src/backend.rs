//! The codec capability the engines are written against
//!
//! [`Libarchive`] is the production backend. The engines only see the traits
//! in this module, so a scripted codec can stand in for libarchive in tests.

use crate::entry::FileType;
use crate::error::Result;
use crate::extract::{ExtractFlags, WriteDisk};
use crate::reader::ArchiveReader;
use crate::status::Status;
use std::borrow::Cow;
use std::path::Path;

/// Outcome of advancing a reader to its next header
pub enum Header<E> {
    /// A header was read; `status` is OK or WARN
    Entry {
        /// View of the header that was just read
        entry: E,
        /// Status returned alongside the header
        status: Status,
    },
    /// No more entries
    End,
    /// No usable header was read
    Error(Status),
}

/// Outcome of reading the next data block of the current entry
pub enum Block<'a> {
    /// A block of entry data
    Data(DataBlock<'a>),
    /// The entry's data is exhausted
    End,
    /// Reading failed
    Error(Status),
}

/// A contiguous run of entry data borrowed from codec memory
///
/// Valid until the next call on the reader that produced it.
#[derive(Debug, Clone, Copy)]
pub struct DataBlock<'a> {
    /// The bytes of the block
    pub bytes: &'a [u8],
    /// Byte offset of the block within the entry
    pub offset: i64,
}

/// Metadata of the entry most recently read from a [`ReadSession`]
pub trait EntryView {
    /// Pathname as stored in the archive, byte for byte
    fn pathname(&self) -> Option<Cow<'_, Path>>;
    /// Declared size of the entry's data in bytes
    fn size(&self) -> u64;
    /// Type of filesystem object the entry describes
    fn file_type(&self) -> FileType;
    /// Hardlink target, if the entry is a hard link
    fn hardlink(&self) -> Option<Cow<'_, Path>>;
    /// Symlink target, if the entry is a symbolic link
    fn symlink(&self) -> Option<Cow<'_, Path>>;
    /// Rewrite the pathname before the entry is handed to a writer
    fn set_pathname(&mut self, path: &Path) -> Result<()>;
    /// Rewrite the hardlink target before the entry is handed to a writer
    fn set_hardlink(&mut self, path: &Path) -> Result<()>;
}

/// An open streaming read session over one archive
pub trait ReadSession {
    /// Borrowed view of the current header
    type Entry<'a>: EntryView
    where
        Self: 'a;

    /// Advance to the next header
    fn next_header(&mut self) -> Header<Self::Entry<'_>>;

    /// Discard the current entry's data
    fn skip_data(&mut self) -> Status;

    /// Read the next block of the current entry's data
    fn read_block(&mut self) -> Block<'_>;
}

/// An open session materializing entries of `R` on the filesystem
pub trait DiskSession<R: ReadSession> {
    /// Create the file, directory or link described by `entry`
    fn write_header(&mut self, entry: &R::Entry<'_>) -> Status;

    /// Write a block at its offset into the file opened by the last header
    fn write_block(&mut self, block: &DataBlock<'_>) -> Status;

    /// Flush the current file and apply deferred metadata
    fn finish_entry(&mut self) -> Status;

    /// Close the session and release the handle
    fn close(self) -> Status
    where
        Self: Sized;
}

/// Factory for reader and writer sessions
pub trait Backend {
    /// Reader session type
    type Reader: ReadSession;
    /// Writer session type
    type Writer: DiskSession<Self::Reader>;

    /// Open `path` for streaming reads with all filters and formats enabled
    fn open_reader(&self, path: &Path, block_size: usize) -> Result<Self::Reader>;

    /// Open a disk writer configured with `flags` and standard identity lookup
    fn open_writer(&self, flags: ExtractFlags) -> Result<Self::Writer>;
}

/// libarchive backend
#[derive(Debug, Clone, Copy, Default)]
pub struct Libarchive;

impl Backend for Libarchive {
    type Reader = ArchiveReader;
    type Writer = WriteDisk;

    fn open_reader(&self, path: &Path, block_size: usize) -> Result<ArchiveReader> {
        ArchiveReader::open(path, block_size)
    }

    fn open_writer(&self, flags: ExtractFlags) -> Result<WriteDisk> {
        let mut disk = WriteDisk::new()?;
        disk.set_options(flags)?;
        disk.set_standard_lookup()?;
        Ok(disk)
    }
}
