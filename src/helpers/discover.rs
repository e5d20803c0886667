//! Installer discovery inside extracted archives.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::{InstallError, Result};

/// Extensions recognized as installer binaries.
pub const INSTALLER_EXTENSIONS: &[&str] = &["exe", "msi", "dmg", "pkg"];

/// True if `path` has an installer extension (case-insensitive).
pub fn is_installer(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            INSTALLER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Find the first installer binary under `dir`.
///
/// Entries are visited depth-first in file-name order, so the same tree
/// always yields the same installer.
pub fn find_installer(dir: &Path) -> Result<PathBuf> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if entry.file_type().is_file() && is_installer(entry.path()) {
            tracing::debug!("found installer {}", entry.path().display());
            return Ok(entry.into_path());
        }
    }

    Err(InstallError::InstallerNotFound {
        dir: dir.to_path_buf(),
    })
}
