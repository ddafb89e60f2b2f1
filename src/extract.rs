//! Writing archive entries to disk

use crate::backend::{DataBlock, DiskSession};
use crate::entry::Entry;
use crate::error::{Error, Result, status_of};
use crate::reader::ArchiveReader;
use crate::status::Status;
use libc::c_void;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// `ARCHIVE_EXTRACT_*` options for the disk writer
///
/// Combine with `|`. Extraction uses [`ExtractFlags::PRESERVE`] unless
/// [`ExtractOptions`](crate::ExtractOptions) is given other flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractFlags(i32);

impl ExtractFlags {
    /// Restore nothing beyond file contents
    pub const NONE: ExtractFlags = ExtractFlags(0);
    /// Restore the recorded uid/gid (needs privileges)
    pub const OWNER: ExtractFlags = ExtractFlags(0x0001);
    /// Restore mode bits
    pub const PERM: ExtractFlags = ExtractFlags(0x0002);
    /// Restore mtime and atime
    pub const TIME: ExtractFlags = ExtractFlags(0x0004);
    /// Keep files that already exist at the target path
    pub const NO_OVERWRITE: ExtractFlags = ExtractFlags(0x0008);
    /// Remove an existing target before writing it
    pub const UNLINK: ExtractFlags = ExtractFlags(0x0010);
    /// Restore access control lists
    pub const ACL: ExtractFlags = ExtractFlags(0x0020);
    /// Restore BSD/ext file flags
    pub const FFLAGS: ExtractFlags = ExtractFlags(0x0040);
    /// Restore extended attributes
    pub const XATTR: ExtractFlags = ExtractFlags(0x0080);
    /// Refuse to write through symlinks in the target path
    pub const SECURE_SYMLINKS: ExtractFlags = ExtractFlags(0x0100);
    /// Let libarchive refuse targets containing `..`
    pub const SECURE_NODOTDOT: ExtractFlags = ExtractFlags(0x0200);
    /// Leave holes for runs of zeros
    pub const SPARSE: ExtractFlags = ExtractFlags(0x1000);
    /// Timestamps, permissions, ACLs and file flags
    pub const PRESERVE: ExtractFlags = ExtractFlags(0x0004 | 0x0002 | 0x0020 | 0x0040);

    const NAMES: [(ExtractFlags, &'static str); 11] = [
        (Self::OWNER, "OWNER"),
        (Self::PERM, "PERM"),
        (Self::TIME, "TIME"),
        (Self::NO_OVERWRITE, "NO_OVERWRITE"),
        (Self::UNLINK, "UNLINK"),
        (Self::ACL, "ACL"),
        (Self::FFLAGS, "FFLAGS"),
        (Self::XATTR, "XATTR"),
        (Self::SECURE_SYMLINKS, "SECURE_SYMLINKS"),
        (Self::SECURE_NODOTDOT, "SECURE_NODOTDOT"),
        (Self::SPARSE, "SPARSE"),
    ];

    /// Raw value passed to `archive_write_disk_set_options`
    pub fn bits(&self) -> i32 {
        self.0
    }

    /// Whether every flag in `other` is set
    pub fn contains(&self, other: ExtractFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ExtractFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        ExtractFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExtractFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ExtractFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "ExtractFlags(NONE)")
        } else {
            write!(f, "ExtractFlags({})", names.join(" | "))
        }
    }
}

/// A libarchive `archive_write_disk` handle
///
/// The handle is released exactly once: by [`DiskSession::close`] when an
/// extraction completes, or by `Drop` when it is abandoned.
pub struct WriteDisk {
    archive: *mut libarchive2_sys::archive,
}

// SAFETY: the handle is owned by this value alone and is only touched
// through `&mut self`, so moving it to another thread is sound.
unsafe impl Send for WriteDisk {}

impl WriteDisk {
    /// Create a new disk writer
    pub fn new() -> Result<Self> {
        unsafe {
            let archive = libarchive2_sys::archive_write_disk_new();
            if archive.is_null() {
                return Err(Error::NullPointer);
            }
            Ok(WriteDisk { archive })
        }
    }

    /// Apply `flags` to every entry written from now on
    pub fn set_options(&mut self, flags: ExtractFlags) -> Result<()> {
        unsafe {
            Error::from_return_code(
                libarchive2_sys::archive_write_disk_set_options(self.archive, flags.bits()),
                self.archive,
            )?;
        }
        Ok(())
    }

    /// Resolve recorded user and group names through the system databases
    pub fn set_standard_lookup(&mut self) -> Result<()> {
        unsafe {
            Error::from_return_code(
                libarchive2_sys::archive_write_disk_set_standard_lookup(self.archive),
                self.archive,
            )?;
        }
        Ok(())
    }
}

impl DiskSession<ArchiveReader> for WriteDisk {
    fn write_header(&mut self, entry: &Entry<'_>) -> Status {
        unsafe {
            let ret = libarchive2_sys::archive_write_header(self.archive, entry.entry);
            status_of(self.archive, ret)
        }
    }

    fn write_block(&mut self, block: &DataBlock<'_>) -> Status {
        unsafe {
            let ret = libarchive2_sys::archive_write_data_block(
                self.archive,
                block.bytes.as_ptr() as *const c_void,
                block.bytes.len(),
                block.offset,
            );
            status_of(self.archive, ret as i32)
        }
    }

    fn finish_entry(&mut self) -> Status {
        unsafe {
            let ret = libarchive2_sys::archive_write_finish_entry(self.archive);
            status_of(self.archive, ret)
        }
    }

    fn close(mut self) -> Status {
        unsafe {
            let ret = libarchive2_sys::archive_write_close(self.archive);
            let status = status_of(self.archive, ret);
            libarchive2_sys::archive_write_free(self.archive);
            self.archive = std::ptr::null_mut();
            status
        }
    }
}

impl Drop for WriteDisk {
    fn drop(&mut self) {
        unsafe {
            if !self.archive.is_null() {
                libarchive2_sys::archive_write_close(self.archive);
                libarchive2_sys::archive_write_free(self.archive);
            }
        }
    }
}
