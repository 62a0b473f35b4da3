//! Error types for the filesystem crate.

use std::io;
use std::path::{Path, PathBuf};

/// Errors from filesystem backend operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path does not exist.
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    /// The backend refused access to the path.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// A directory operation was attempted on something else.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A file operation was attempted on something that is not a regular file.
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Any other I/O failure from the underlying storage.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an `io::Error` raised while operating on `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Returns `true` if the error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_are_classified() {
        let p = Path::new("/x");
        assert!(FsError::from_io(p, io::Error::from(io::ErrorKind::NotFound)).is_not_found());
        assert!(matches!(
            FsError::from_io(p, io::Error::from(io::ErrorKind::PermissionDenied)),
            FsError::PermissionDenied(_)
        ));
        assert!(matches!(
            FsError::from_io(p, io::Error::new(io::ErrorKind::Other, "boom")),
            FsError::Io { .. }
        ));
    }

    #[test]
    fn messages_name_the_path() {
        let err = FsError::PermissionDenied(PathBuf::from("/backup/secret"));
        assert_eq!(err.to_string(), "permission denied: /backup/secret");
    }
}
