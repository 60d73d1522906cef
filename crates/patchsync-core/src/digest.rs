//! Content digest verification.
//!
//! Files are streamed through MD5 in fixed-size chunks so large
//! installations never need a whole file in memory. Digests are rendered
//! as lower-case hex without separators and compared case-insensitively.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use thiserror::Error;

/// Read buffer size for hashing.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Failure to hash a file.
#[derive(Debug, Error)]
#[error("Failed to hash {}: {source}", path.display())]
pub struct DigestError {
    /// File being hashed.
    pub path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    pub source: io::Error,
}

impl DigestError {
    /// True if the file disappeared before or during hashing.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Compute the hex digest of a file.
pub fn compute_digest(path: &Path) -> Result<String, DigestError> {
    let wrap = |source| DigestError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(wrap)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(wrap(e)),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a file against an expected hex digest.
pub fn verify(path: &Path, expected_digest_hex: &str) -> Result<bool, DigestError> {
    let actual = compute_digest(path)?;
    Ok(actual.eq_ignore_ascii_case(expected_digest_hex.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // md5("") and md5("hello world")
    const EMPTY: &str = "d41d8cd98f00b204e9800998ecf8427e";
    const HELLO: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    #[test]
    fn digest_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        let hello = dir.path().join("hello");
        std::fs::write(&empty, b"").unwrap();
        std::fs::write(&hello, b"hello world").unwrap();

        assert_eq!(compute_digest(&empty).unwrap(), EMPTY);
        assert_eq!(compute_digest(&hello).unwrap(), HELLO);
    }

    #[test]
    fn digest_spans_multiple_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big");
        let data = vec![0xABu8; CHUNK_SIZE * 2 + 17];
        std::fs::write(&path, &data).unwrap();

        let mut hasher = Md5::new();
        hasher.update(&data);
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(compute_digest(&path).unwrap(), expected);
    }

    #[test]
    fn verify_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello");
        std::fs::write(&path, b"hello world").unwrap();

        assert!(verify(&path, HELLO).unwrap());
        assert!(verify(&path, &HELLO.to_uppercase()).unwrap());
        assert!(!verify(&path, EMPTY).unwrap());
    }

    #[test]
    fn vanished_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify(&dir.path().join("gone"), HELLO).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("gone"));
    }
}
