//! Archive reading functionality

use crate::backend::{Block, DataBlock, Header, ReadSession};
use crate::entry::Entry;
use crate::error::{Error, Result, status_of};
use crate::status::{Code, Status};
use libc::c_void;
use std::ffi::CString;
use std::marker::PhantomData;
use std::path::Path;
use std::ptr;

/// Archive reader with RAII resource management
///
/// The underlying handle is released exactly once, when the reader is
/// dropped, whichever way the owning operation ends.
pub struct ArchiveReader {
    archive: *mut libarchive2_sys::archive,
}

// SAFETY: ArchiveReader owns its archive pointer exclusively, and libarchive
// read objects can move between threads as long as they are not used
// concurrently.
unsafe impl Send for ArchiveReader {}

impl ArchiveReader {
    /// Create a new archive reader
    pub fn new() -> Result<Self> {
        unsafe {
            let archive = libarchive2_sys::archive_read_new();
            if archive.is_null() {
                return Err(Error::NullPointer);
            }
            Ok(ArchiveReader { archive })
        }
    }

    /// Open an archive file for streaming reads
    ///
    /// Every compression filter and archive format libarchive knows is
    /// enabled, so the container is detected from its content.
    /// `block_size` is the read size hint passed to libarchive.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidArgument("Path contains invalid UTF-8".to_string()))?;
        let c_path = CString::new(path_str)
            .map_err(|_| Error::InvalidArgument("Path contains null byte".to_string()))?;

        let mut reader = Self::new()?;
        reader.support_filter_all()?;
        reader.support_format_all()?;

        let ret = unsafe {
            libarchive2_sys::archive_read_open_filename(reader.archive, c_path.as_ptr(), block_size)
        };
        if Code::from_raw(ret) != Code::Ok {
            let status = unsafe { status_of(reader.archive, ret) };
            return Err(Error::Open {
                path: path.to_path_buf(),
                message: status.to_string(),
            });
        }

        Ok(reader)
    }

    /// Enable support for all compression filters
    pub fn support_filter_all(&mut self) -> Result<()> {
        unsafe {
            Error::from_return_code(
                libarchive2_sys::archive_read_support_filter_all(self.archive),
                self.archive,
            )?;
        }
        Ok(())
    }

    /// Enable support for all archive formats
    pub fn support_format_all(&mut self) -> Result<()> {
        unsafe {
            Error::from_return_code(
                libarchive2_sys::archive_read_support_format_all(self.archive),
                self.archive,
            )?;
        }
        Ok(())
    }
}

impl ReadSession for ArchiveReader {
    type Entry<'a> = Entry<'a>;

    fn next_header(&mut self) -> Header<Entry<'_>> {
        let mut entry: *mut libarchive2_sys::archive_entry = ptr::null_mut();
        let ret = unsafe { libarchive2_sys::archive_read_next_header(self.archive, &mut entry) };

        match Code::from_raw(ret) {
            Code::Eof => Header::End,
            Code::Ok | Code::Warn if !entry.is_null() => Header::Entry {
                entry: Entry {
                    entry,
                    _marker: PhantomData,
                },
                status: unsafe { status_of(self.archive, ret) },
            },
            Code::Ok | Code::Warn => Header::Error(Status::with_message(
                Code::Fatal,
                "libarchive returned a header without an entry",
            )),
            _ => Header::Error(unsafe { status_of(self.archive, ret) }),
        }
    }

    fn skip_data(&mut self) -> Status {
        unsafe {
            let ret = libarchive2_sys::archive_read_data_skip(self.archive) as i32;
            status_of(self.archive, ret)
        }
    }

    fn read_block(&mut self) -> Block<'_> {
        let mut buf: *const c_void = ptr::null();
        let mut size = 0;
        let mut offset = 0;
        let ret = unsafe {
            libarchive2_sys::archive_read_data_block(self.archive, &mut buf, &mut size, &mut offset)
        };

        match Code::from_raw(ret) {
            Code::Eof => Block::End,
            Code::Ok => {
                let len = size as usize;
                let bytes = if buf.is_null() || len == 0 {
                    &[][..]
                } else {
                    // SAFETY: libarchive guarantees `buf` points to `size` readable bytes
                    // until the next read call on this handle, which requires `&mut self`
                    // and therefore ends this borrow first.
                    unsafe { std::slice::from_raw_parts(buf as *const u8, len) }
                };
                Block::Data(DataBlock {
                    bytes,
                    offset: offset as i64,
                })
            }
            _ => Block::Error(unsafe { status_of(self.archive, ret) }),
        }
    }
}

impl Drop for ArchiveReader {
    fn drop(&mut self) {
        unsafe {
            if !self.archive.is_null() {
                libarchive2_sys::archive_read_close(self.archive);
                libarchive2_sys::archive_read_free(self.archive);
            }
        }
    }
}
