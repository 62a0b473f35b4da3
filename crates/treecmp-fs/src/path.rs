//! Root-relative paths.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

/// A path relative to a comparison root, stored as its ordered segments.
///
/// Ordering is segment-wise, so `a/b` sorts before `a.txt` and both trees
/// produce the same key for the same file regardless of the platform
/// separator. The empty path denotes the root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath {
    segments: Vec<OsString>,
}

impl RelativePath {
    /// The empty path (the root itself).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build from a path that is already relative to some root.
    ///
    /// `.` components are dropped; prefixes, root markers and `..` are
    /// rejected since they cannot appear in a walk below a root.
    pub fn from_path(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_os_string()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(Self { segments })
    }

    /// Strip `root` from `full` and build the relative path of the rest.
    pub fn under(root: &Path, full: &Path) -> Option<Self> {
        full.strip_prefix(root).ok().and_then(Self::from_path)
    }

    /// Extend this path by one segment.
    pub fn join(&self, name: impl AsRef<OsStr>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.as_ref().to_os_string());
        Self { segments }
    }

    /// Every strict ancestor of this path, nearest first, excluding the root.
    pub fn ancestors(&self) -> impl Iterator<Item = RelativePath> + '_ {
        (1..self.segments.len()).rev().map(move |len| RelativePath {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Resolve this path against a root directory.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut full = root.to_path_buf();
        for segment in &self.segments {
            full.push(segment);
        }
        full
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str(".");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment.to_string_lossy())?;
        }
        Ok(())
    }
}

impl Serialize for RelativePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self {
            segments: s
                .split('/')
                .filter(|seg| !seg.is_empty() && *seg != ".")
                .map(OsString::from)
                .collect(),
        }
    }
}
