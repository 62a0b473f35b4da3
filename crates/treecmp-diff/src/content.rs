//! Streaming byte-for-byte content comparison.

use std::io::{self, Read};
use std::path::Path;

use treecmp_fs::{FileSystem, FsError, FsResult};

/// Compares file contents chunk by chunk through two reusable buffers.
///
/// One comparer is meant to serve many file pairs in turn; the buffers are
/// allocated once. Both readers are dropped before [`same_content`] returns,
/// on success and on error alike.
///
/// [`same_content`]: ContentComparer::same_content
#[derive(Debug)]
pub struct ContentComparer {
    left: Vec<u8>,
    right: Vec<u8>,
}

impl ContentComparer {
    /// Allocate buffers of `chunk_size` bytes each (at least one byte).
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            left: vec![0; chunk_size],
            right: vec![0; chunk_size],
        }
    }

    /// Returns `Ok(true)` if both files hold exactly the same bytes.
    ///
    /// Stops at the first chunk that differs in length or bytes.
    pub fn same_content(
        &mut self,
        fs: &dyn FileSystem,
        left: &Path,
        right: &Path,
    ) -> FsResult<bool> {
        let mut left_reader = fs.open(left)?;
        let mut right_reader = fs.open(right)?;

        loop {
            let n_left =
                fill(&mut left_reader, &mut self.left).map_err(|e| FsError::from_io(left, e))?;
            let n_right =
                fill(&mut right_reader, &mut self.right).map_err(|e| FsError::from_io(right, e))?;

            if n_left != n_right || self.left[..n_left] != self.right[..n_right] {
                return Ok(false);
            }
            if n_left == 0 {
                return Ok(true);
            }
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
