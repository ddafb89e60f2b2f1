//! Builds `.tar.gz` fixtures on the fly
#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::{EntryType, Header};

pub const MTIME: u64 = 1_000_000_000;

pub enum Fixture<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
    Hardlink(&'a str, &'a str),
    Symlink(&'a str, &'a str),
    /// Name bytes stored verbatim, bypassing the path checks of the `tar` crate
    RawName(&'a [u8], &'a [u8]),
}

pub fn tar_gz(path: &Path, entries: &[Fixture<'_>]) {
    let file = File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for entry in entries {
        let mut header = Header::new_gnu();
        header.set_mtime(MTIME);
        match *entry {
            Fixture::File(name, data) => {
                header.set_entry_type(EntryType::Regular);
                header.set_mode(0o640);
                header.set_size(data.len() as u64);
                header.set_cksum();
                builder.append_data(&mut header, name, data).unwrap();
            }
            Fixture::Dir(name) => {
                header.set_entry_type(EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                header.set_cksum();
                builder.append_data(&mut header, name, std::io::empty()).unwrap();
            }
            Fixture::Hardlink(name, target) => {
                header.set_entry_type(EntryType::Link);
                header.set_mode(0o640);
                header.set_size(0);
                builder.append_link(&mut header, name, target).unwrap();
            }
            Fixture::Symlink(name, target) => {
                header.set_entry_type(EntryType::Symlink);
                header.set_mode(0o777);
                header.set_size(0);
                builder.append_link(&mut header, name, target).unwrap();
            }
            Fixture::RawName(name, data) => {
                header.set_entry_type(EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(data.len() as u64);
                let raw = &mut header.as_old_mut().name;
                raw[..name.len()].copy_from_slice(name);
                header.set_cksum();
                builder.append(&header, data).unwrap();
            }
        }
    }

    builder.into_inner().unwrap().finish().unwrap();
}

/// Relative path and content of every regular file under `root`, sorted
pub fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                out.push((rel, std::fs::read(&path).unwrap()));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

/// Listed paths as strings, for comparing against literals
pub fn names(paths: &[PathBuf]) -> Vec<&str> {
    paths.iter().map(|p| p.to_str().unwrap()).collect()
}
