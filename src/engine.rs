//! Extraction engine: drives a reader session and a disk writer in lockstep

use crate::backend::{Backend, Block, DiskSession, EntryView, Header, Libarchive, ReadSession};
use crate::config::ExtractOptions;
use crate::entry::FileType;
use crate::error::Result;
use crate::path::{Destination, default_destination};
use crate::report::ExtractReport;
use crate::status::{Status, enforce};
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

const OPERATION: &str = "extraction";

/// What to do with the current entry once its header has been handled
enum Disposition {
    /// The header reached the disk writer
    Written { size: u64, file_type: FileType },
    /// The entry is not extracted; its data must be skipped
    Skipped,
}

/// Extracts archives to a destination directory
///
/// # Examples
///
/// ```no_run
/// use archive_extract::{ExtractOptions, Extractor};
/// use std::path::Path;
///
/// let extractor = Extractor::new(ExtractOptions::default());
/// let report = extractor.extract(Path::new("a.tar.gz"), Some(Path::new("/tmp/out")))?;
/// println!("{} entries, {} bytes", report.entries(), report.bytes_written);
/// # Ok::<(), archive_extract::Error>(())
/// ```
pub struct Extractor<B: Backend = Libarchive> {
    backend: B,
    options: ExtractOptions,
}

impl Extractor<Libarchive> {
    /// Create an extractor backed by libarchive
    pub fn new(options: ExtractOptions) -> Self {
        Self::with_backend(Libarchive, options)
    }
}

impl<B: Backend> Extractor<B> {
    /// Create an extractor over another codec backend
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Extractor { backend, options }
    }

    /// Options this extractor runs with
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract every entry of `source` under `destination`
    ///
    /// Without a destination, entries land next to the archive. Entries
    /// already written stay on disk when the run aborts.
    pub fn extract(&self, source: &Path, destination: Option<&Path>) -> Result<ExtractReport> {
        let root = match destination {
            Some(root) => root.to_path_buf(),
            None => {
                let root = default_destination(source);
                info!("no destination given, extracting into {}", root.display());
                root
            }
        };

        let started = Instant::now();
        let mut reader = self.backend.open_reader(source, self.options.block_size)?;
        let mut writer = self.backend.open_writer(self.options.flags)?;
        debug!(
            source = %source.display(),
            root = %root.display(),
            flags = ?self.options.flags,
            "extracting"
        );

        let mut destination = Destination::new(&root, self.options.path_policy);
        let mut report = ExtractReport::default();
        loop {
            let disposition = match reader.next_header() {
                Header::End => break,
                Header::Error(status) => {
                    self.check(&status, "read header", &mut report)?;
                    continue;
                }
                Header::Entry { mut entry, status } => {
                    self.check(&status, "read header", &mut report)?;
                    self.write_header(&mut entry, &mut destination, &mut writer, &mut report)?
                }
            };

            match disposition {
                Disposition::Skipped => {
                    let status = reader.skip_data();
                    self.check(&status, "skip data", &mut report)?;
                }
                Disposition::Written { size, file_type } => {
                    if size > 0 {
                        let status = copy_data(&mut reader, &mut writer, &mut report.bytes_written);
                        self.check(&status, "copy data", &mut report)?;
                    }
                    let status = writer.finish_entry();
                    self.check(&status, "finish entry", &mut report)?;
                    report.record(file_type);
                }
            }
        }

        drop(reader);
        let status = writer.close();
        self.check(&status, "close writer", &mut report)?;

        report.duration = started.elapsed();
        debug!(
            entries = report.entries(),
            bytes = report.bytes_written,
            skipped = report.skipped.len(),
            "extraction finished"
        );
        Ok(report)
    }

    /// Redirect the entry under the destination root and commit its header to disk
    fn write_header(
        &self,
        entry: &mut <B::Reader as ReadSession>::Entry<'_>,
        destination: &mut Destination<'_>,
        writer: &mut B::Writer,
        report: &mut ExtractReport,
    ) -> Result<Disposition> {
        let Some(original) = entry.pathname().map(Cow::into_owned) else {
            warn!("skipping entry without a pathname");
            report.warnings += 1;
            report.skipped.push(String::new());
            return Ok(Disposition::Skipped);
        };
        let shown = original.display().to_string();

        let target = match destination.resolve(&original) {
            Ok(target) => target,
            Err(reason) => return Ok(skip(shown, &reason.to_string(), report)),
        };

        let link_target = match entry.hardlink().map(Cow::into_owned) {
            None => None,
            Some(link) => match destination.resolve(&link) {
                Ok(link_target) => Some(link_target),
                Err(reason) => {
                    let reason = format!("hardlink target {}: {reason}", link.display());
                    return Ok(skip(shown, &reason, report));
                }
            },
        };

        let file_type = entry.file_type();
        if file_type == FileType::SymbolicLink {
            let points_to = entry.symlink().map(Cow::into_owned).unwrap_or_default();
            if let Err(reason) = destination.add_symlink(&original, &points_to) {
                let reason = format!("symlink target {}: {reason}", points_to.display());
                return Ok(skip(shown, &reason, report));
            }
        }

        entry.set_pathname(&target)?;
        if let Some(link_target) = &link_target {
            entry.set_hardlink(link_target)?;
        }

        let size = entry.size();
        debug!(path = %shown, target = %target.display(), size, "writing entry");

        let status = writer.write_header(entry);
        self.check(&status, "write header", report)?;
        Ok(Disposition::Written { size, file_type })
    }

    fn check(&self, status: &Status, step: &str, report: &mut ExtractReport) -> Result<()> {
        if enforce(status, OPERATION, step)? {
            report.warnings += 1;
        }
        Ok(())
    }
}

fn skip(pathname: String, reason: &str, report: &mut ExtractReport) -> Disposition {
    warn!(path = %pathname, "skipping entry: {reason}");
    report.warnings += 1;
    report.skipped.push(pathname);
    Disposition::Skipped
}

/// Copy the current entry's data block by block
///
/// Returns OK once the reader reports the end of the entry, otherwise the
/// first status below OK from either side.
fn copy_data<R, W>(reader: &mut R, writer: &mut W, written: &mut u64) -> Status
where
    R: ReadSession,
    W: DiskSession<R>,
{
    loop {
        let block = match reader.read_block() {
            Block::End => return Status::OK,
            Block::Error(status) => return status,
            Block::Data(block) => block,
        };
        let status = writer.write_block(&block);
        if status.is_error() {
            return status;
        }
        *written += block.bytes.len() as u64;
    }
}
