//! Error types for the diff crate.
//!
//! Only conditions that abort a whole run live here. Per-path failures are
//! recorded as [`Classification::ReadError`](crate::Classification::ReadError)
//! in the result instead.

use std::path::PathBuf;

use treecmp_fs::FsError;

/// Fatal errors that stop a comparison before it produces a result.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// A root does not exist.
    #[error("root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A root exists but is not a directory.
    #[error("root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    /// A root exists but cannot be stat'ed or listed.
    #[error("root not readable: {}: {source}", path.display())]
    RootNotReadable {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    /// The options cannot drive a comparison.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Convenience alias for comparison results.
pub type CompareResult<T> = Result<T, CompareError>;
