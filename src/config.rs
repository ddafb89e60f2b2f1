//! Extraction configuration

use crate::extract::ExtractFlags;

/// Read block size handed to libarchive when opening a file, in bytes
///
/// This is the value libarchive's documentation uses for
/// `archive_read_open_filename`.
pub const DEFAULT_BLOCK_SIZE: usize = 10240;

/// How entry pathnames are joined onto the destination root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathPolicy {
    /// Reject entries that are absolute or climb above the destination root
    #[default]
    Contained,
    /// Join every entry as-is, letting `..` segments escape the root
    Unrestricted,
}

/// Options shared by the listing and extraction passes
///
/// # Examples
///
/// ```
/// use archive_extract::{ExtractFlags, ExtractOptions, PathPolicy};
///
/// let options = ExtractOptions::new()
///     .block_size(64 * 1024)
///     .flags(ExtractFlags::PRESERVE | ExtractFlags::XATTR)
///     .path_policy(PathPolicy::Contained);
/// assert_eq!(options.block_size, 65536);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Read block size hint for the reader session
    pub block_size: usize,
    /// Flags configured on the disk writer
    pub flags: ExtractFlags,
    /// Destination path policy
    pub path_policy: PathPolicy,
}

impl ExtractOptions {
    /// Default options: 10240-byte blocks, metadata preservation, contained paths
    pub fn new() -> Self {
        ExtractOptions {
            block_size: DEFAULT_BLOCK_SIZE,
            flags: ExtractFlags::PRESERVE,
            path_policy: PathPolicy::default(),
        }
    }

    /// Set the read block size hint
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the disk writer flags
    pub fn flags(mut self, flags: ExtractFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the destination path policy
    pub fn path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}
