//! Enumeration of a single root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use treecmp_fs::{FileEntry, FileSystem, FsError, RelativePath, WalkItem};

use crate::error::{CompareError, CompareResult};

/// Lazy sequence of everything found below a validated root.
///
/// Yields regular files, symlinks and special files as
/// [`WalkItem::Entry`], and locations that could not be read as
/// [`WalkItem::Unreadable`]. Directories are walked but not yielded.
pub struct Enumeration<'a> {
    root: PathBuf,
    inner: Box<dyn Iterator<Item = WalkItem> + 'a>,
}

impl Enumeration<'_> {
    /// The root this enumeration walks.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Enumeration<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        self.inner.next()
    }
}

/// Start enumerating `root`.
///
/// The root is checked up front: it must exist, be a directory (a link to
/// one is accepted on every backend) and be listable. Any failure here is
/// fatal. Nothing below the root is read until the enumeration is polled.
pub fn enumerate<'a>(fs: &'a dyn FileSystem, root: &Path) -> CompareResult<Enumeration<'a>> {
    let meta = fs.metadata(root).map_err(|e| match e {
        FsError::NotFound(_) => CompareError::RootNotFound(root.to_path_buf()),
        other => CompareError::RootNotReadable {
            path: root.to_path_buf(),
            source: other,
        },
    })?;
    if !meta.kind.is_dir() {
        return Err(CompareError::RootNotDirectory(root.to_path_buf()));
    }
    fs.list_dir(root).map_err(|e| CompareError::RootNotReadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(Enumeration {
        root: root.to_path_buf(),
        inner: fs.walk(root),
    })
}

/// A fully collected enumeration, keyed by relative path.
#[derive(Clone, Debug, Default)]
pub struct TreeListing {
    pub entries: BTreeMap<RelativePath, FileEntry>,
    /// Paths that could not be read, with the reason. A directory here
    /// stands for its whole subtree.
    pub unreadable: BTreeMap<RelativePath, String>,
}

impl TreeListing {
    /// Drain an enumeration that has already passed its root checks.
    pub fn collect(enumeration: Enumeration<'_>) -> Self {
        let root = enumeration.root().to_path_buf();
        let mut listing = Self::default();
        for item in enumeration {
            match item {
                WalkItem::Entry(entry) => {
                    listing.entries.insert(entry.path.clone(), entry);
                }
                WalkItem::Unreadable { path, message } => {
                    warn!(
                        root = %root.display(),
                        path = %path,
                        %message,
                        "skipping unreadable location"
                    );
                    listing.unreadable.insert(path, message);
                }
            }
        }
        debug!(
            root = %root.display(),
            entries = listing.entries.len(),
            unreadable = listing.unreadable.len(),
            "scan complete"
        );
        listing
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
