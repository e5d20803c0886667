//! Archive extraction
//!
//! Native extraction for zip and tar (plain, gz, bz2, xz, zst). Entries that
//! would land outside the destination are refused: absolute paths, `..`
//! components, writes through symlinks, and links pointing out of the tree.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::core::error::{InstallError, Result};
use crate::helpers::progress::Progress;

/// Archive formats rootbeer can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    TarZst,
}

impl ArchiveFormat {
    /// Detect format from a file name or URL (case-insensitive).
    pub fn detect(name: &str) -> Option<Self> {
        let path = name.to_lowercase();
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if path.ends_with(".tar.xz") || path.ends_with(".txz") {
            Some(Self::TarXz)
        } else if path.ends_with(".tar.bz2") || path.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if path.ends_with(".tar.zst") || path.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if path.ends_with(".zip") {
            Some(Self::Zip)
        } else if path.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::TarZst => "tar.zst",
        }
    }
}

/// Extract `archive` into `dest`, creating `dest` if needed.
pub fn extract(archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let failed = |reason: String| InstallError::ExtractionFailed {
        archive: archive.display().to_string(),
        reason,
    };

    std::fs::create_dir_all(dest)
        .map_err(|e| failed(format!("cannot create destination directory: {}", e)))?;

    let label = archive
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let _progress = Progress::spinner(&format!("extracting {}", label));

    let reader = File::open(archive)
        .map(BufReader::new)
        .map_err(|e| failed(format!("cannot open: {}", e)))?;

    let result = match format {
        ArchiveFormat::Zip => extract_zip(reader, dest),
        ArchiveFormat::Tar => extract_tar(reader, dest),
        ArchiveFormat::TarGz => extract_tar(flate2::read::GzDecoder::new(reader), dest),
        ArchiveFormat::TarBz2 => extract_tar(bzip2::read::BzDecoder::new(reader), dest),
        ArchiveFormat::TarXz => extract_tar(xz2::read::XzDecoder::new(reader), dest),
        ArchiveFormat::TarZst => zstd::stream::read::Decoder::new(reader)
            .map_err(|e| format!("cannot start zstd decoder: {}", e))
            .and_then(|decoder| extract_tar(decoder, dest)),
    };

    result.map_err(failed)?;
    tracing::debug!("unpacked {} ({}) into {}", label, format.name(), dest.display());
    Ok(())
}

/// Destination root that archive entries are confined to.
struct Jail<'a> {
    root: &'a Path,
    norm_root: PathBuf,
}

impl<'a> Jail<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            norm_root: normalize_lexical(root),
        }
    }

    /// Where an entry named `name` lands. Absolute names and `..` are refused.
    fn place(&self, name: &Path) -> Result<PathBuf, String> {
        let escapes = name.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(format!("entry escapes destination: {}", name.display()));
        }

        let target = self.root.join(name);
        self.refuse_symlinks(&target)?;
        Ok(target)
    }

    /// Fail if any existing component between the root and `target` is a
    /// symlink; writing through it could land anywhere.
    fn refuse_symlinks(&self, target: &Path) -> Result<(), String> {
        let Ok(rel) = target.strip_prefix(self.root) else {
            return Err(format!("entry escapes destination: {}", target.display()));
        };

        let mut walked = self.root.to_path_buf();
        for part in rel.components() {
            walked.push(part);
            let is_link = std::fs::symlink_metadata(&walked)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if is_link {
                return Err(format!("entry writes through symlink {}", walked.display()));
            }
        }
        Ok(())
    }

    /// A link placed at `at` pointing to `target` must resolve inside the root.
    fn check_link(&self, at: &Path, target: &Path) -> Result<(), String> {
        if target.has_root() || target.is_absolute() {
            return Err(format!("absolute link target: {}", target.display()));
        }

        let base = at.parent().unwrap_or(self.root);
        let resolved = normalize_lexical(&base.join(target));
        if !resolved.starts_with(&self.norm_root) {
            return Err(format!(
                "link target escapes destination: {} -> {}",
                at.display(),
                target.display()
            ));
        }
        Ok(())
    }

    /// Hard link names are relative to the archive root, not to the entry.
    /// Returns the existing path the new link should share.
    fn check_hard_link(&self, target: &Path) -> Result<PathBuf, String> {
        if target.has_root() || target.is_absolute() {
            return Err(format!("absolute link target: {}", target.display()));
        }

        let source = self.root.join(target);
        let resolved = normalize_lexical(&source);
        if !resolved.starts_with(&self.norm_root) || resolved == self.norm_root {
            return Err(format!(
                "link target escapes destination: {}",
                target.display()
            ));
        }
        self.refuse_symlinks(&source)?;
        Ok(source)
    }
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn mkdirs(dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {}", dir.display(), e))
}

fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<(), String> {
    let jail = Jail::new(dest);
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| format!("cannot read tar: {}", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| format!("bad tar entry: {}", e))?;
        let name = entry
            .path()
            .map_err(|e| format!("bad tar entry name: {}", e))?
            .into_owned();

        // "./" style root entries carry nothing.
        if name.components().all(|c| c == Component::CurDir) {
            continue;
        }

        let target = jail.place(&name)?;

        let kind = entry.header().entry_type();
        let link = if kind.is_symlink() || kind.is_hard_link() {
            let link = entry
                .link_name()
                .map_err(|e| format!("bad link in {}: {}", name.display(), e))?
                .ok_or_else(|| format!("link without target: {}", name.display()))?;
            Some(link.into_owned())
        } else {
            None
        };

        if let Some(parent) = target.parent() {
            mkdirs(parent)?;
        }

        match link {
            Some(link) if kind.is_hard_link() => {
                let source = jail.check_hard_link(&link)?;
                std::fs::hard_link(&source, &target).map_err(|e| {
                    format!("cannot link {} to {}: {}", name.display(), link.display(), e)
                })?;
                continue;
            }
            Some(link) => jail.check_link(&target, &link)?,
            None => {}
        }

        entry
            .unpack(&target)
            .map_err(|e| format!("cannot unpack {}: {}", name.display(), e))?;
    }

    Ok(())
}

fn extract_zip<R: Read + std::io::Seek>(reader: R, dest: &Path) -> Result<(), String> {
    let jail = Jail::new(dest);
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| format!("cannot read zip: {}", e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("bad zip entry #{}: {}", i, e))?;
        let Some(name) = entry.enclosed_name() else {
            return Err(format!("entry escapes destination: {}", entry.name()));
        };
        let target = jail.place(&name)?;

        if entry.is_dir() {
            mkdirs(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            mkdirs(parent)?;
        }

        let mut out =
            File::create(&target).map_err(|e| format!("cannot create {}: {}", target.display(), e))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| format!("cannot write {}: {}", target.display(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    Ok(())
}
