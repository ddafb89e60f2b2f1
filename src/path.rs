//! Joining entry pathnames onto the destination root

use crate::config::PathPolicy;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Why an entry was refused under [`PathPolicy::Contained`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsafePath {
    /// The pathname or link target is absolute or carries a drive prefix
    #[error("absolute path")]
    Absolute,
    /// A `..` segment climbs above the destination root
    #[error("path escapes the destination root")]
    Escapes,
    /// The path goes through a symlink extracted earlier in the same run
    #[error("path passes through an extracted symlink")]
    ThroughSymlink,
}

/// Directory entries are extracted into when none is given: the archive's parent
///
/// An archive named without any directory component resolves to `.`.
pub fn default_destination(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Rewrite an entry pathname to its location under `root`
///
/// # Examples
///
/// ```
/// use archive_extract::{PathPolicy, destination_path};
/// use std::path::Path;
///
/// let root = Path::new("/tmp/out");
/// let joined = destination_path(root, "dir/./note.md", PathPolicy::Contained).unwrap();
/// assert_eq!(joined, Path::new("/tmp/out/dir/note.md"));
///
/// assert!(destination_path(root, "../escape.txt", PathPolicy::Contained).is_err());
/// let escaped = destination_path(root, "../escape.txt", PathPolicy::Unrestricted).unwrap();
/// assert_eq!(escaped, Path::new("/tmp/escape.txt"));
/// ```
pub fn destination_path(
    root: &Path,
    entry: impl AsRef<Path>,
    policy: PathPolicy,
) -> Result<PathBuf, UnsafePath> {
    let entry = entry.as_ref();
    match policy {
        PathPolicy::Contained => Ok(root.join(normalize(entry)?)),
        PathPolicy::Unrestricted => Ok(unrestricted(root, entry)),
    }
}

/// Lexically normalized form of a relative entry path
fn normalize(entry: &Path) -> Result<PathBuf, UnsafePath> {
    let mut parts = Vec::new();
    for component in entry.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return Err(UnsafePath::Absolute),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(UnsafePath::Escapes);
                }
            }
            Component::Normal(part) => parts.push(part),
        }
    }
    Ok(parts.into_iter().collect())
}

fn unrestricted(root: &Path, entry: &Path) -> PathBuf {
    let mut joined = root.to_path_buf();
    for component in entry.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                let last = joined.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    joined.pop();
                } else {
                    joined.push("..");
                }
            }
            Component::Normal(part) => joined.push(part),
        }
    }
    joined
}

/// Resolves the entries of one extraction run under its destination root
///
/// Under [`PathPolicy::Contained`] it also remembers every symlink the run
/// extracted. A symlink target must stay inside the root when resolved from
/// the link's directory, and no later entry may be written through an
/// extracted symlink.
pub(crate) struct Destination<'a> {
    root: &'a Path,
    policy: PathPolicy,
    symlinks: HashSet<PathBuf>,
}

impl<'a> Destination<'a> {
    pub(crate) fn new(root: &'a Path, policy: PathPolicy) -> Self {
        Destination {
            root,
            policy,
            symlinks: HashSet::new(),
        }
    }

    /// Where `entry` is written, for entry pathnames and hardlink targets alike
    pub(crate) fn resolve(&self, entry: &Path) -> Result<PathBuf, UnsafePath> {
        match self.policy {
            PathPolicy::Unrestricted => Ok(unrestricted(self.root, entry)),
            PathPolicy::Contained => {
                let relative = normalize(entry)?;
                self.check_ancestors(&relative)?;
                Ok(self.root.join(relative))
            }
        }
    }

    /// Accept the symlink `link -> target` and remember it
    pub(crate) fn add_symlink(&mut self, link: &Path, target: &Path) -> Result<(), UnsafePath> {
        if self.policy == PathPolicy::Unrestricted {
            return Ok(());
        }
        let link = normalize(link)?;
        self.check_ancestors(&link)?;

        let mut here: PathBuf = link.parent().map(Path::to_path_buf).unwrap_or_default();
        for component in target.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => return Err(UnsafePath::Absolute),
                Component::CurDir => continue,
                Component::ParentDir | Component::Normal(_) => {}
            }
            if self.symlinks.contains(&here) {
                return Err(UnsafePath::ThroughSymlink);
            }
            match component {
                Component::ParentDir => {
                    if !here.pop() {
                        return Err(UnsafePath::Escapes);
                    }
                }
                Component::Normal(part) => here.push(part),
                _ => {}
            }
        }

        self.symlinks.insert(link);
        Ok(())
    }

    fn check_ancestors(&self, relative: &Path) -> Result<(), UnsafePath> {
        if relative.ancestors().skip(1).any(|a| self.symlinks.contains(a)) {
            return Err(UnsafePath::ThroughSymlink);
        }
        Ok(())
    }
}
