use md5::Md5;
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Sha1 => write!(f, "sha1"),
        }
    }
}

/// Stream `path` through the digest in chunks of `buffer_size` bytes and
/// return the lowercase hex digest. Read errors are returned untouched so
/// callers can tell a vanished file from a permission problem.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm, buffer_size: usize) -> io::Result<String> {
    let file = File::open(path)?;
    match algorithm {
        HashAlgorithm::Md5 => stream_digest::<Md5>(file, buffer_size),
        HashAlgorithm::Sha1 => stream_digest::<Sha1>(file, buffer_size),
    }
}

fn stream_digest<D: Digest>(mut reader: impl Read, buffer_size: usize) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("md5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("SHA1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert!(matches!(
            "sha256".parse::<HashAlgorithm>(),
            Err(Error::UnsupportedAlgorithm(name)) if name == "sha256"
        ));
    }

    #[test]
    fn test_known_digests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, "abc").unwrap();

        assert_eq!(
            hash_file(&path, HashAlgorithm::Md5, 64).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hash_file(&path, HashAlgorithm::Sha1, 64).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_digest_independent_of_buffer_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let small = hash_file(&path, HashAlgorithm::Sha1, 64).unwrap();
        let large = hash_file(&path, HashAlgorithm::Sha1, 65536).unwrap();
        assert_eq!(small, large);
        assert_eq!(small.len(), 40);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = hash_file(&dir.path().join("gone"), HashAlgorithm::Md5, 64).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
