//! Listing engine: entry pathnames without touching entry data

use crate::backend::{Backend, EntryView, Header, Libarchive, ReadSession};
use crate::config::DEFAULT_BLOCK_SIZE;
use crate::error::Result;
use crate::report::Listing;
use crate::status::enforce;
use std::borrow::Cow;
use std::path::Path;
use tracing::warn;

const OPERATION: &str = "listing";

/// Lists the entries of archives
///
/// Each call opens its own reader session, independent of any extraction
/// running over the same archive.
pub struct Lister<B: Backend = Libarchive> {
    backend: B,
    block_size: usize,
}

impl Lister<Libarchive> {
    /// Create a lister backed by libarchive
    pub fn new() -> Self {
        Self::with_backend(Libarchive)
    }
}

impl Default for Lister<Libarchive> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Lister<B> {
    /// Create a lister over another codec backend
    pub fn with_backend(backend: B) -> Self {
        Lister {
            backend,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Set the read block size hint
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Collect the pathname of every entry in `source`, in archive order
    pub fn list(&self, source: &Path) -> Result<Listing> {
        let mut reader = self.backend.open_reader(source, self.block_size)?;
        let mut listing = Listing::default();

        loop {
            let pathname = match reader.next_header() {
                Header::End => break,
                Header::Error(status) => {
                    if enforce(&status, OPERATION, "read header")? {
                        listing.warnings += 1;
                    }
                    continue;
                }
                Header::Entry { entry, status } => {
                    if enforce(&status, OPERATION, "read header")? {
                        listing.warnings += 1;
                    }
                    entry.pathname().map(Cow::into_owned)
                }
            };

            match pathname {
                Some(pathname) => listing.paths.push(pathname),
                None => {
                    warn!("entry without a pathname");
                    listing.warnings += 1;
                }
            }

            let status = reader.skip_data();
            if enforce(&status, OPERATION, "skip data")? {
                listing.warnings += 1;
            }
        }

        Ok(listing)
    }
}
