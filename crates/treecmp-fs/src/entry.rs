//! Entry types produced by stat and walk operations.

use std::fs;
use std::time::SystemTime;

use serde::Serialize;

use crate::path::RelativePath;

/// What kind of filesystem object an entry is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A regular file; the only kind whose content is compared.
    File,
    /// A directory. Walked into, never yielded.
    Directory,
    /// A symbolic link. Reported, never followed.
    Symlink,
    /// Devices, fifos, sockets and anything else.
    Other,
}

impl EntryKind {
    /// Returns `true` for regular files.
    pub fn is_file(self) -> bool {
        self == Self::File
    }

    /// Returns `true` for directories.
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }

    /// Human-readable name, used in reports.
    pub fn describe(self) -> &'static str {
        match self {
            Self::File => "a regular file",
            Self::Directory => "a directory",
            Self::Symlink => "a symlink",
            Self::Other => "a special file",
        }
    }
}

impl From<fs::FileType> for EntryKind {
    fn from(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Directory
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Stat result for a single path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMetadata {
    pub kind: EntryKind,
    /// Size in bytes (link target length for symlinks on most platforms).
    pub size: u64,
    /// Last modification time, if the backend can report one.
    pub mtime: Option<SystemTime>,
}

impl From<&fs::Metadata> for EntryMetadata {
    fn from(meta: &fs::Metadata) -> Self {
        Self {
            kind: EntryKind::from(meta.file_type()),
            size: meta.len(),
            mtime: meta.modified().ok(),
        }
    }
}

/// A non-directory entry found under a root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the root it was found under.
    pub path: RelativePath,
    pub kind: EntryKind,
    pub size: u64,
    pub mtime: Option<SystemTime>,
}

impl FileEntry {
    /// Pair a relative path with its metadata.
    pub fn new(path: RelativePath, meta: EntryMetadata) -> Self {
        Self {
            path,
            kind: meta.kind,
            size: meta.size,
            mtime: meta.mtime,
        }
    }

    /// Returns `true` for regular files.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}
