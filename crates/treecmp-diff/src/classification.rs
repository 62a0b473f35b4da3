//! Per-path outcome types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};
use treecmp_fs::{EntryKind, FileEntry, RelativePath};

/// The outcome assigned to one relative path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Present under the left root only.
    OnlyInLeft,
    /// Present under the right root only.
    OnlyInRight,
    /// Same kind, size, content and modification time.
    Identical,
    /// Same content, different modification time.
    DifferentMetadataSameContent,
    /// Kind, size or content differs.
    Different,
    /// The path, or the subtree it roots, could not be read.
    ReadError { message: String },
}

impl Classification {
    /// Short tag for reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::OnlyInLeft => "only in left",
            Self::OnlyInRight => "only in right",
            Self::Identical => "identical",
            Self::DifferentMetadataSameContent => "metadata only",
            Self::Different => "modified",
            Self::ReadError { .. } => "read error",
        }
    }

    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::ReadError { .. })
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadError { message } => write!(f, "read error: {message}"),
            other => f.write_str(other.tag()),
        }
    }
}

/// Whether and how content was compared for a path present on both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCheck {
    /// Not read: kinds or sizes already differed, the entries are not
    /// regular files, or reading failed.
    Skipped,
    Same,
    Differ,
}

/// How the two sides of a path present in both trees relate.
///
/// Orderings read left against right: `mtime == Greater` means the left copy
/// is newer, `size == Less` means the right copy is larger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MetadataDelta {
    pub left_kind: EntryKind,
    pub right_kind: EntryKind,
    #[serde(serialize_with = "serialize_ordering")]
    pub mtime: Ordering,
    #[serde(serialize_with = "serialize_ordering")]
    pub size: Ordering,
    pub content: ContentCheck,
}

impl MetadataDelta {
    /// Compare the metadata of two entries; content starts out unchecked.
    pub fn between(left: &FileEntry, right: &FileEntry) -> Self {
        Self {
            left_kind: left.kind,
            right_kind: right.kind,
            mtime: left.mtime.cmp(&right.mtime),
            size: left.size.cmp(&right.size),
            content: ContentCheck::Skipped,
        }
    }

    pub fn kinds_match(&self) -> bool {
        self.left_kind == self.right_kind
    }
}

fn serialize_ordering<S: Serializer>(ord: &Ordering, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(match ord {
        Ordering::Less => "less",
        Ordering::Equal => "equal",
        Ordering::Greater => "greater",
    })
}

/// The final record for one relative path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathComparison {
    pub path: RelativePath,
    pub classification: Classification,
    /// Present whenever the path existed on both sides and was stat'ed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<MetadataDelta>,
}

impl PathComparison {
    pub fn new(path: RelativePath, classification: Classification) -> Self {
        Self {
            path,
            classification,
            delta: None,
        }
    }

    pub fn with_delta(mut self, delta: MetadataDelta) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn read_error(path: RelativePath, message: impl Into<String>) -> Self {
        Self::new(
            path,
            Classification::ReadError {
                message: message.into(),
            },
        )
    }
}
