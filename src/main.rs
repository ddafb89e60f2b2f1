//! archive-extract: list an archive's entries, then extract it

mod cli;

use anyhow::{Context, Result};
use archive_extract::{Extractor, Lister};
use clap::Parser;
use cli::Cli;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    debug!(
        libarchive = %archive_extract::libarchive_version(),
        details = %archive_extract::libarchive_version_details(),
        "starting"
    );

    // Both passes always run; each opens the archive on its own.
    let listed = report(list(&cli));
    let extracted = report(extract(&cli));
    if listed && extracted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report(result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            eprintln!("error: {err:#}");
            false
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn list(cli: &Cli) -> Result<()> {
    let listing = Lister::new()
        .block_size(cli.block_size)
        .list(&cli.archive)
        .with_context(|| format!("failed to list {}", cli.archive.display()))?;

    let mut out = io::stdout().lock();
    for path in &listing.paths {
        write_path(&mut out, path)?;
    }
    out.flush()?;
    Ok(())
}

/// Print one listed pathname as the archive stores it
#[cfg(unix)]
fn write_path(out: &mut impl Write, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    out.write_all(path.as_os_str().as_bytes())?;
    out.write_all(b"\n")
}

#[cfg(not(unix))]
fn write_path(out: &mut impl Write, path: &Path) -> io::Result<()> {
    writeln!(out, "{}", path.display())
}

fn extract(cli: &Cli) -> Result<()> {
    let report = Extractor::new(cli.options())
        .extract(&cli.archive, cli.destination.as_deref())
        .with_context(|| format!("failed to extract {}", cli.archive.display()))?;

    if !report.skipped.is_empty() {
        warn!(
            "{} entries were not extracted: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }
    info!(
        entries = report.entries(),
        bytes = report.bytes_written,
        warnings = report.warnings,
        "extracted in {:.2?}",
        report.duration
    );
    Ok(())
}
