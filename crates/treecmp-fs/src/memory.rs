use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::SystemTime;

use crate::entry::{EntryKind, EntryMetadata};
use crate::error::{FsError, FsResult};
use crate::traits::FileSystem;

/// Links are resolved at most this many times per lookup.
const MAX_LINK_HOPS: usize = 16;

#[derive(Clone, Debug)]
enum NodeData {
    File(Vec<u8>),
    Directory,
    Symlink(PathBuf),
    Other,
}

#[derive(Clone, Debug)]
struct Node {
    data: NodeData,
    mtime: SystemTime,
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self.data {
            NodeData::File(_) => EntryKind::File,
            NodeData::Directory => EntryKind::Directory,
            NodeData::Symlink(_) => EntryKind::Symlink,
            NodeData::Other => EntryKind::Other,
        }
    }

    fn meta(&self) -> EntryMetadata {
        let size = match &self.data {
            NodeData::File(bytes) => bytes.len() as u64,
            NodeData::Symlink(target) => target.as_os_str().len() as u64,
            NodeData::Directory | NodeData::Other => 0,
        };
        EntryMetadata {
            kind: self.kind(),
            size,
            mtime: Some(self.mtime),
        }
    }
}

/// In-memory, `BTreeMap`-based filesystem.
///
/// Intended for tests and embedding. Paths are absolute keys; adding an
/// entry creates its missing parent directories. Beyond plain storage it
/// counts every `open` and `list_dir` call and can inject two kinds of failure:
///
/// - [`deny`](Self::deny): listing or opening the path fails with
///   `PermissionDenied`, like a `chmod 000` on local disk.
/// - [`fail_reads`](Self::fail_reads): opening succeeds but every read
///   returns an I/O error, like a bad sector.
pub struct InMemoryFileSystem {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
    denied: RwLock<BTreeSet<PathBuf>>,
    failing: RwLock<BTreeSet<PathBuf>>,
    opens: AtomicUsize,
    opened: RwLock<Vec<PathBuf>>,
    lists: AtomicUsize,
}

impl InMemoryFileSystem {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            denied: RwLock::new(BTreeSet::new()),
            failing: RwLock::new(BTreeSet::new()),
            opens: AtomicUsize::new(0),
            opened: RwLock::new(Vec::new()),
            lists: AtomicUsize::new(0),
        }
    }

    /// Add (or replace) a regular file.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &[u8], mtime: SystemTime) {
        self.insert(
            path.as_ref(),
            Node {
                data: NodeData::File(contents.to_vec()),
                mtime,
            },
        );
    }

    /// Add a directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            Node {
                data: NodeData::Directory,
                mtime: SystemTime::UNIX_EPOCH,
            },
        );
    }

    /// Add a symbolic link pointing at `target`.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            Node {
                data: NodeData::Symlink(target.as_ref().to_path_buf()),
                mtime: SystemTime::UNIX_EPOCH,
            },
        );
    }

    /// Add a special file (device, fifo, socket).
    pub fn add_special(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            Node {
                data: NodeData::Other,
                mtime: SystemTime::UNIX_EPOCH,
            },
        );
    }

    /// Change the modification time of an existing entry.
    pub fn set_mtime(&self, path: impl AsRef<Path>, mtime: SystemTime) {
        if let Some(node) = self.write_nodes().get_mut(path.as_ref()) {
            node.mtime = mtime;
        }
    }

    /// Make listing and opening `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .write()
            .expect("lock poisoned")
            .insert(path.as_ref().to_path_buf());
    }

    /// Make every read from `path` fail after a successful open.
    pub fn fail_reads(&self, path: impl AsRef<Path>) {
        self.failing
            .write()
            .expect("lock poisoned")
            .insert(path.as_ref().to_path_buf());
    }

    /// Number of `open` calls made so far, successful or not.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of `list_dir` calls made so far, successful or not.
    pub fn list_count(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Every path passed to `open`, in call order.
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.opened.read().expect("lock poisoned").clone()
    }

    fn write_nodes(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<PathBuf, Node>> {
        self.nodes.write().expect("lock poisoned")
    }

    fn insert(&self, path: &Path, node: Node) {
        let mut nodes = self.write_nodes();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node {
                data: NodeData::Directory,
                mtime: SystemTime::UNIX_EPOCH,
            });
        }
        nodes.insert(path.to_path_buf(), node);
    }

    fn is_denied(&self, path: &Path) -> bool {
        self.denied.read().expect("lock poisoned").contains(path)
    }

    /// Follow symlinks through every component of `path`.
    ///
    /// The last component is followed only when `follow_last` is set, which
    /// matches `stat` versus `lstat` on local disk. Relative link targets
    /// are taken relative to the link's directory.
    fn resolve(&self, path: &Path, follow_last: bool) -> FsResult<PathBuf> {
        let nodes = self.nodes.read().expect("lock poisoned");
        let mut hops = 0;
        let mut resolved = PathBuf::new();
        let mut components = path.components().peekable();
        while let Some(component) = components.next() {
            resolved.push(component);
            if components.peek().is_none() && !follow_last {
                break;
            }
            while let Some(Node {
                data: NodeData::Symlink(target),
                ..
            }) = nodes.get(&resolved)
            {
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    return Err(FsError::Io {
                        path: path.to_path_buf(),
                        source: io::Error::new(
                            io::ErrorKind::Other,
                            "too many levels of symbolic links",
                        ),
                    });
                }
                resolved = match resolved.parent() {
                    Some(parent) if target.is_relative() => parent.join(target),
                    _ => target.clone(),
                };
            }
        }
        Ok(resolved)
    }

    /// Look up the node at an already resolved path, reporting `shown` on
    /// failure.
    fn lookup(&self, resolved: &Path, shown: &Path) -> FsResult<Node> {
        self.nodes
            .read()
            .expect("lock poisoned")
            .get(resolved)
            .cloned()
            .ok_or_else(|| FsError::NotFound(shown.to_path_buf()))
    }
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for InMemoryFileSystem {
    fn metadata(&self, path: &Path) -> FsResult<EntryMetadata> {
        let resolved = self.resolve(path, true)?;
        self.lookup(&resolved, path).map(|node| node.meta())
    }

    fn symlink_metadata(&self, path: &Path) -> FsResult<EntryMetadata> {
        let resolved = self.resolve(path, false)?;
        self.lookup(&resolved, path).map(|node| node.meta())
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<OsString>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let dir = self.resolve(path, true)?;
        let node = self.lookup(&dir, path)?;
        if !matches!(node.data, NodeData::Directory) {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }
        if self.is_denied(&dir) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        let nodes = self.nodes.read().expect("lock poisoned");
        Ok(nodes
            .range(dir.clone()..)
            .skip(1)
            .take_while(|(p, _)| p.starts_with(&dir))
            .filter(|(p, _)| p.parent() == Some(dir.as_path()))
            .filter_map(|(p, _)| p.file_name().map(|n| n.to_os_string()))
            .collect())
    }

    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send + '_>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.opened
            .write()
            .expect("lock poisoned")
            .push(path.to_path_buf());

        let file = self.resolve(path, true)?;
        if self.is_denied(&file) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        match self.lookup(&file, path)?.data {
            NodeData::File(bytes) => {
                if self.failing.read().expect("lock poisoned").contains(&file) {
                    Ok(Box::new(FailingReader))
                } else {
                    Ok(Box::new(Cursor::new(bytes)))
                }
            }
            _ => Err(FsError::NotAFile(path.to_path_buf())),
        }
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "injected read failure"))
    }
}
