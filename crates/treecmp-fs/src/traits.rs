use std::ffi::OsString;
use std::io::Read;
use std::path::Path;

use crate::entry::EntryMetadata;
use crate::error::FsResult;
use crate::walk::{Walk, WalkItem};

/// A backing store that can be compared.
///
/// Implementations must satisfy these invariants:
/// - `symlink_metadata` never follows a link in the last component;
///   `metadata`, `list_dir` and `open` do. Links in parent components are
///   always followed, so a root that is a link to a directory walks like
///   the directory itself.
/// - `list_dir` returns bare child names, in any order.
/// - Readers returned by `open` own their handle; dropping the reader
///   releases it.
/// - All I/O errors are propagated, never silently ignored.
pub trait FileSystem: Send + Sync {
    /// Stat a path, following symbolic links.
    fn metadata(&self, path: &Path) -> FsResult<EntryMetadata>;

    /// Stat a path without following symbolic links.
    fn symlink_metadata(&self, path: &Path) -> FsResult<EntryMetadata>;

    /// List the names of a directory's children.
    fn list_dir(&self, path: &Path) -> FsResult<Vec<OsString>>;

    /// Open a regular file for streaming reads.
    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send + '_>>;

    /// Walk everything below `root`, yielding non-directory entries.
    ///
    /// Default implementation is a worklist traversal built on `list_dir`
    /// and `symlink_metadata`. Backends may override with a native walker.
    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkItem> + 'a> {
        Box::new(Walk::new(self, root))
    }
}
