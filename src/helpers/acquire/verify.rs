//! SHA-256 verification of downloaded artifacts.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

use crate::core::error::{InstallError, Result};

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Hex-encoded SHA-256 of everything `reader` yields.
pub fn sha256_reader(reader: &mut impl Read) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hex-encoded SHA-256 of a file.
pub fn sha256_file(file: &Path) -> std::io::Result<String> {
    let mut f = std::fs::File::open(file)?;
    sha256_reader(&mut f)
}

/// Verify a file against an expected SHA-256 (case-insensitive).
pub fn verify_sha256(file: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(file)?;
    let expected = expected.trim().to_lowercase();

    if actual != expected {
        return Err(InstallError::ChecksumMismatch { expected, actual });
    }

    Ok(())
}
