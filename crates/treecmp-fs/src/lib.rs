//! Filesystem access layer for treecmp.
//!
//! The comparison engine never touches `std::fs` directly. Everything it
//! needs from a backing store -- stat an entry, list a directory, open a file
//! for streaming reads, walk a tree -- goes through the [`FileSystem`] trait.
//!
//! # Backends
//!
//! - [`LocalFileSystem`] -- the local disk (or any mounted share), walked with `walkdir`
//! - [`InMemoryFileSystem`] -- a `BTreeMap`-backed tree for tests and embedding,
//!   with read instrumentation and injectable failures
//!
//! # Key Types
//!
//! - [`RelativePath`] -- a path relative to a root, the join key between two trees
//! - [`FileEntry`] / [`EntryMetadata`] / [`EntryKind`] -- what a walk yields
//! - [`WalkItem`] -- one step of a walk: an entry or an unreadable location
//!
//! # Rules
//!
//! 1. Walks never follow symbolic links; links are yielded as [`EntryKind::Symlink`].
//! 2. Directories are descended into but never yielded.
//! 3. A directory that cannot be listed is yielded once as [`WalkItem::Unreadable`];
//!    its siblings are still walked.

pub mod entry;
pub mod error;
pub mod local;
pub mod memory;
pub mod path;
pub mod traits;
pub mod walk;

pub use entry::{EntryKind, EntryMetadata, FileEntry};
pub use error::{FsError, FsResult};
pub use local::LocalFileSystem;
pub use memory::InMemoryFileSystem;
pub use path::RelativePath;
pub use traits::FileSystem;
pub use walk::{Walk, WalkItem};
