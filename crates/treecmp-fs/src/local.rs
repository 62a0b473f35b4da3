use std::ffi::OsString;
use std::fs;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::entry::{EntryMetadata, FileEntry};
use crate::error::{FsError, FsResult};
use crate::path::RelativePath;
use crate::traits::FileSystem;
use crate::walk::WalkItem;

/// The local disk, or anything mounted into it.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn metadata(&self, path: &Path) -> FsResult<EntryMetadata> {
        fs::metadata(path)
            .map(|m| EntryMetadata::from(&m))
            .map_err(|e| FsError::from_io(path, e))
    }

    fn symlink_metadata(&self, path: &Path) -> FsResult<EntryMetadata> {
        fs::symlink_metadata(path)
            .map(|m| EntryMetadata::from(&m))
            .map_err(|e| FsError::from_io(path, e))
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| FsError::from_io(path, e))? {
            let entry = entry.map_err(|e| FsError::from_io(path, e))?;
            names.push(entry.file_name());
        }
        Ok(names)
    }

    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send + '_>> {
        let file = fs::File::open(path).map_err(|e| FsError::from_io(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkItem> + 'a> {
        let root = root.to_path_buf();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_map(move |res| match res {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        return None;
                    }
                    let path = RelativePath::under(&root, entry.path())?;
                    Some(match entry.metadata() {
                        Ok(meta) => {
                            WalkItem::Entry(FileEntry::new(path, EntryMetadata::from(&meta)))
                        }
                        Err(e) => WalkItem::Unreadable {
                            path,
                            message: e.to_string(),
                        },
                    })
                }
                Err(e) => {
                    let path = e
                        .path()
                        .and_then(|p| RelativePath::under(&root, p))
                        .unwrap_or_default();
                    debug!(path = %path, error = %e, "walk error");
                    Some(WalkItem::Unreadable {
                        path,
                        message: describe_walk_error(&e),
                    })
                }
            });
        Box::new(walker)
    }
}

fn describe_walk_error(err: &walkdir::Error) -> String {
    match (err.io_error(), err.path()) {
        (Some(io_err), Some(path)) if io_err.kind() == io::ErrorKind::PermissionDenied => {
            FsError::PermissionDenied(path.to_path_buf()).to_string()
        }
        _ => err.to_string(),
    }
}
