//! Archive entry views

use crate::backend::EntryView;
use crate::error::{Error, Result};
use libc::c_char;
use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// File type of an archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    RegularFile,
    /// Directory
    Directory,
    /// Symbolic link
    SymbolicLink,
    /// Block device
    BlockDevice,
    /// Character device
    CharacterDevice,
    /// FIFO/named pipe
    Fifo,
    /// Socket
    Socket,
    /// Unknown type
    Unknown,
}

impl FileType {
    /// Decode the `S_IFMT` bits of a mode
    pub fn from_mode(mode: u32) -> Self {
        const S_IFMT: u32 = 0o170000;
        const S_IFREG: u32 = 0o100000;
        const S_IFDIR: u32 = 0o040000;
        const S_IFLNK: u32 = 0o120000;
        const S_IFBLK: u32 = 0o060000;
        const S_IFCHR: u32 = 0o020000;
        const S_IFIFO: u32 = 0o010000;
        const S_IFSOCK: u32 = 0o140000;

        match mode & S_IFMT {
            S_IFREG => FileType::RegularFile,
            S_IFDIR => FileType::Directory,
            S_IFLNK => FileType::SymbolicLink,
            S_IFBLK => FileType::BlockDevice,
            S_IFCHR => FileType::CharacterDevice,
            S_IFIFO => FileType::Fifo,
            S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }
}

/// The header most recently read from an [`ArchiveReader`](crate::ArchiveReader)
///
/// The entry memory belongs to the reader and is reused by the next
/// `next_header` call, so the view mutably borrows the reader for its whole
/// lifetime.
pub struct Entry<'a> {
    pub(crate) entry: *mut libarchive2_sys::archive_entry,
    pub(crate) _marker: PhantomData<&'a mut ()>,
}

impl Entry<'_> {
    /// Copy a string field out of the entry, preferring the form stored in
    /// the archive over libarchive's UTF-8 conversion.
    fn text(native: *const c_char, utf8: *const c_char) -> Option<Cow<'static, Path>> {
        // SAFETY: both pointers come from libarchive accessors on a live entry and are
        // either null or NUL-terminated. The bytes are copied out before returning.
        let bytes = unsafe {
            if !native.is_null() {
                CStr::from_ptr(native).to_bytes()
            } else if !utf8.is_null() {
                CStr::from_ptr(utf8).to_bytes()
            } else {
                return None;
            }
        };
        Some(Cow::Owned(path_from_bytes(bytes)))
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(unix)]
fn to_c_path(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| Error::InvalidArgument("Path contains null byte".to_string()))
}

#[cfg(not(unix))]
fn to_c_path(path: &Path) -> Result<CString> {
    let path_str = path
        .to_str()
        .ok_or_else(|| Error::InvalidArgument("Path contains invalid UTF-8".to_string()))?;
    CString::new(path_str)
        .map_err(|_| Error::InvalidArgument("Path contains null byte".to_string()))
}

impl EntryView for Entry<'_> {
    fn pathname(&self) -> Option<Cow<'_, Path>> {
        unsafe {
            Self::text(
                libarchive2_sys::archive_entry_pathname(self.entry),
                libarchive2_sys::archive_entry_pathname_utf8(self.entry),
            )
        }
    }

    fn size(&self) -> u64 {
        let size = unsafe { libarchive2_sys::archive_entry_size(self.entry) };
        size.max(0) as u64
    }

    fn file_type(&self) -> FileType {
        unsafe {
            let mode = libarchive2_sys::archive_entry_filetype(self.entry);
            FileType::from_mode(mode as u32)
        }
    }

    fn hardlink(&self) -> Option<Cow<'_, Path>> {
        unsafe {
            Self::text(
                libarchive2_sys::archive_entry_hardlink(self.entry),
                libarchive2_sys::archive_entry_hardlink_utf8(self.entry),
            )
        }
    }

    fn symlink(&self) -> Option<Cow<'_, Path>> {
        unsafe {
            Self::text(
                libarchive2_sys::archive_entry_symlink(self.entry),
                libarchive2_sys::archive_entry_symlink_utf8(self.entry),
            )
        }
    }

    fn set_pathname(&mut self, path: &Path) -> Result<()> {
        let c_path = to_c_path(path)?;
        // The locale form is written verbatim by the disk writer.
        unsafe {
            libarchive2_sys::archive_entry_set_pathname(self.entry, c_path.as_ptr());
        }
        Ok(())
    }

    fn set_hardlink(&mut self, path: &Path) -> Result<()> {
        let c_path = to_c_path(path)?;
        unsafe {
            libarchive2_sys::archive_entry_set_hardlink(self.entry, c_path.as_ptr());
        }
        Ok(())
    }
}
