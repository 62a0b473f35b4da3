//! Worklist-based tree walk over any [`FileSystem`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::entry::FileEntry;
use crate::path::RelativePath;
use crate::traits::FileSystem;

/// One step of a walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkItem {
    /// A non-directory entry.
    Entry(FileEntry),
    /// A location that could not be listed or stat'ed.
    ///
    /// For a directory this covers the whole subtree beneath it.
    Unreadable { path: RelativePath, message: String },
}

impl WalkItem {
    /// The relative path this item refers to.
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::Entry(entry) => &entry.path,
            Self::Unreadable { path, .. } => path,
        }
    }
}

/// Lazy depth-first walk driven by an explicit stack of pending directories.
///
/// Each directory is listed only when the items already produced have been
/// consumed, so memory stays proportional to the widest directory plus the
/// pending stack rather than the whole tree.
pub struct Walk<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    root: PathBuf,
    pending_dirs: Vec<RelativePath>,
    ready: VecDeque<WalkItem>,
}

impl<'a, F: FileSystem + ?Sized> Walk<'a, F> {
    /// Start a walk at `root`. The root itself is listed on first use.
    pub fn new(fs: &'a F, root: &Path) -> Self {
        Self {
            fs,
            root: root.to_path_buf(),
            pending_dirs: vec![RelativePath::root()],
            ready: VecDeque::new(),
        }
    }

    fn expand(&mut self, dir: RelativePath) {
        let full = dir.resolve(&self.root);
        let names = match self.fs.list_dir(&full) {
            Ok(names) => names,
            Err(e) => {
                debug!(dir = %dir, error = %e, "directory unreadable");
                self.ready.push_back(WalkItem::Unreadable {
                    path: dir,
                    message: e.to_string(),
                });
                return;
            }
        };

        for name in names {
            let child = dir.join(&name);
            match self.fs.symlink_metadata(&full.join(&name)) {
                Ok(meta) if meta.kind.is_dir() => self.pending_dirs.push(child),
                Ok(meta) => self.ready.push_back(WalkItem::Entry(FileEntry::new(child, meta))),
                Err(e) => self.ready.push_back(WalkItem::Unreadable {
                    path: child,
                    message: e.to_string(),
                }),
            }
        }
    }
}

impl<F: FileSystem + ?Sized> Iterator for Walk<'_, F> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(item);
            }
            let dir = self.pending_dirs.pop()?;
            self.expand(dir);
        }
    }
}
