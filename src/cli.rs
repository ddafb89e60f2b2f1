//! Command-line arguments

use archive_extract::{DEFAULT_BLOCK_SIZE, ExtractOptions, PathPolicy};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archive-extract")]
#[command(version, about = "List the entries of an archive, then extract it", long_about = None)]
pub struct Cli {
    /// Archive to list and extract; filter and format are detected from its content
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Directory to extract into (default: the archive's directory)
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Read block size hint passed to libarchive, in bytes
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_BLOCK_SIZE,
        value_parser = parse_block_size
    )]
    pub block_size: usize,

    /// Extract entries whose paths leave the destination directory
    #[arg(long)]
    pub unrestricted_paths: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn options(&self) -> ExtractOptions {
        let policy = if self.unrestricted_paths {
            PathPolicy::Unrestricted
        } else {
            PathPolicy::Contained
        };
        ExtractOptions::new()
            .block_size(self.block_size)
            .path_policy(policy)
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("block size must be at least 1 byte".to_string()),
        Ok(size) => Ok(size),
        Err(e) => Err(format!("invalid block size: {e}")),
    }
}
