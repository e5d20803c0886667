//! Artifact pipeline - getting packages onto disk
//!
//! `download -> verify -> extract`, each step a possible failure point:
//!
//! - **download**: stream the artifact into a fresh temporary file
//! - **verify**: SHA-256 against the recipe's checksum, if it has one
//! - **extract**: unpack known archive formats into a fresh temporary
//!   directory and drop the downloaded file
//!
//! The result is an [`Artifact`] that owns whichever of the two survived
//! and deletes it when dropped, on success and failure paths alike.

pub mod download;
pub mod extract;
pub mod verify;

use std::path::Path;
use std::time::Duration;
use tempfile::{TempDir, TempPath};

use crate::core::error::Result;
use extract::ArchiveFormat;

/// A temporary file or directory holding a package artifact.
///
/// Removed from disk when dropped.
#[derive(Debug)]
pub enum Artifact {
    /// A single downloaded file (installer, disk image, ...).
    File(TempPath),
    /// An extracted archive.
    Directory(TempDir),
}

impl Artifact {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) => &**p,
            Self::Directory(d) => d.path(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Make sure the artifact is an extracted directory.
    ///
    /// A file is unpacked as `format` into a new temporary directory and
    /// deleted; a directory is returned unchanged.
    pub fn into_extracted(self, format: ArchiveFormat) -> Result<Artifact> {
        match self {
            dir @ Self::Directory(_) => Ok(dir),
            Self::File(file) => {
                let dir = tempfile::Builder::new().prefix("rootbeer_").tempdir()?;
                extract::extract(&file, dir.path(), format)?;
                file.close()?;
                Ok(Self::Directory(dir))
            }
        }
    }

    /// Remove the artifact now, reporting any error.
    pub fn close(self) -> std::io::Result<()> {
        match self {
            Self::File(p) => p.close(),
            Self::Directory(d) => d.close(),
        }
    }
}

/// Downloads, verifies and unpacks package artifacts.
#[derive(Debug, Clone)]
pub struct Pipeline {
    download_timeout: Duration,
}

impl Pipeline {
    pub fn new(download_timeout: Duration) -> Self {
        Self { download_timeout }
    }

    /// Acquire the artifact at `location`.
    ///
    /// Returns a directory when the location names a known archive format,
    /// otherwise the downloaded file. Exactly one of the two exists on disk
    /// afterwards; on error neither does.
    pub fn fetch_and_prepare(&self, location: &str, checksum: Option<&str>) -> Result<Artifact> {
        tracing::info!("Downloading {}", location);
        let staged = download::fetch(location, self.download_timeout)?;

        if let Some(expected) = checksum {
            tracing::info!("Verifying package checksum");
            verify::verify_sha256(&staged, expected)?;
        }

        let artifact = Artifact::File(staged);
        match ArchiveFormat::detect(&download::artifact_file_name(location)) {
            Some(format) => {
                tracing::info!("Extracting {} archive", format.name());
                artifact.into_extracted(format)
            }
            None => Ok(artifact),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}
