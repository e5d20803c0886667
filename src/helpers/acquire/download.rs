//! Artifact download
//!
//! Streams an artifact into a fresh temporary file. `http://` and
//! `https://` locations go over the network; `file://` URLs and plain paths
//! are copied from disk. The staged file keeps the artifact's own name as a
//! suffix so archive detection and Windows executable lookup still work.

use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::TempPath;

use crate::core::error::{InstallError, Result};
use crate::helpers::progress::Progress;

const USER_AGENT: &str = concat!("rootbeer/", env!("CARGO_PKG_VERSION"));

/// True for locations fetched over HTTP(S).
pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Longest artifact name kept in a staged file name, in bytes.
const MAX_FILE_NAME: usize = 100;
/// Longest extension carried over when a name is shortened.
const MAX_SUFFIX: usize = 16;

/// File name of the artifact at `location`.
///
/// Query strings and fragments are ignored; falls back to "download".
/// Long names are cut down to [`MAX_FILE_NAME`] bytes, keeping the extension.
pub fn artifact_file_name(location: &str) -> String {
    let clean = location.split(['?', '#']).next().unwrap_or(location);
    let last = clean
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download");
    shorten(sanitize_filename(last))
}

/// Truncate the stem of `name` so the whole fits in [`MAX_FILE_NAME`].
/// Compound tar extensions (`.tar.gz`) are kept whole.
fn shorten(name: String) -> String {
    if name.len() <= MAX_FILE_NAME {
        return name;
    }

    let lower = name.to_ascii_lowercase();
    let suffix_at = lower
        .rfind(".tar.")
        .filter(|&i| !lower[i + 5..].contains('.'))
        .or_else(|| lower.rfind('.'))
        .filter(|&i| i > 0 && name.len() - i <= MAX_SUFFIX);
    let suffix = suffix_at.map_or("", |i| &name[i..]);

    let mut stem_end = MAX_FILE_NAME - suffix.len();
    while !name.is_char_boundary(stem_end) {
        stem_end -= 1;
    }
    format!("{}{}", &name[..stem_end], suffix)
}

/// Replace characters that are unsafe in file names.
fn sanitize_filename(name: &str) -> String {
    if name == "." || name == ".." {
        return "download".to_string();
    }
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Fetch `location` into a new temporary file and return its path.
///
/// The file is removed when the returned [`TempPath`] is dropped, including
/// when this function fails part way.
pub fn fetch(location: &str, timeout: Duration) -> Result<TempPath> {
    let failed = |reason: String| InstallError::DownloadFailed {
        url: location.to_string(),
        reason,
    };

    let filename = artifact_file_name(location);
    let mut staged = tempfile::Builder::new()
        .prefix("rootbeer_")
        .suffix(&format!("-{}", filename))
        .tempfile()
        .map_err(|e| failed(format!("cannot create temporary file: {}", e)))?;

    let total_bytes = if is_remote(location) {
        download_with_progress(location, staged.as_file_mut(), &filename, timeout)?
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        copy_local(Path::new(path), staged.as_file_mut()).map_err(|e| failed(e.to_string()))?
    };

    staged
        .as_file_mut()
        .flush()
        .map_err(|e| failed(format!("write error: {}", e)))?;

    tracing::debug!("downloaded {} ({} bytes)", filename, total_bytes);
    Ok(staged.into_temp_path())
}

fn copy_local(src: &Path, dest: &mut std::fs::File) -> std::io::Result<u64> {
    let mut file = std::fs::File::open(src)?;
    std::io::copy(&mut file, dest)
}

/// Stream `url` into `dest` behind a progress bar.
fn download_with_progress(
    url: &str,
    dest: &mut std::fs::File,
    filename: &str,
    timeout: Duration,
) -> Result<u64> {
    let failed = |reason: String| InstallError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let progress = Progress::spinner(&format!("downloading {}", filename));

    let response = ureq::get(url)
        .timeout(timeout)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(code, _) => failed(format!("HTTP {}", code)),
            other => failed(other.to_string()),
        })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        progress.set_total(len);
    }

    let mut sink = Counted {
        inner: dest,
        written: 0,
        progress: &progress,
    };
    std::io::copy(&mut response.into_reader(), &mut sink)
        .map_err(|e| failed(format!("transfer interrupted: {}", e)))
}

/// Writer that reports bytes written to a progress bar.
struct Counted<'a, W> {
    inner: W,
    written: u64,
    progress: &'a Progress,
}

impl<W: Write> Write for Counted<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        self.progress.set_position(self.written);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::acquire::extract::ArchiveFormat;

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("https://example.com/foo-1.0.zip"), "foo-1.0.zip");
        assert_eq!(artifact_file_name("https://example.com/setup.exe?v=2#x"), "setup.exe");
        assert_eq!(artifact_file_name("https://example.com/"), "download");
        assert_eq!(artifact_file_name("/srv/pkgs/tool.tar.gz"), "tool.tar.gz");
        assert_eq!(artifact_file_name("C:\\pkgs\\tool.msi"), "tool.msi");
    }

    #[test]
    fn test_long_names_keep_their_extension() {
        let exe = format!("{}.exe", "a".repeat(240));
        let short = artifact_file_name(&format!("https://cdn.example.com/{}", exe));
        assert_eq!(short.len(), MAX_FILE_NAME);
        assert!(short.ends_with("aaa.exe"));

        let tarball = format!("https://cdn.example.com/{}.tar.gz?sig=abc", "b".repeat(300));
        let short = artifact_file_name(&tarball);
        assert!(short.len() <= MAX_FILE_NAME);
        assert_eq!(ArchiveFormat::detect(&short), Some(ArchiveFormat::TarGz));

        // Multi-byte characters are never split.
        let wide = artifact_file_name(&format!("{}.msi", "é".repeat(120)));
        assert!(wide.len() <= MAX_FILE_NAME);
        assert!(wide.ends_with("é.msi"));
    }

    #[test]
    fn test_fetch_local_file_with_long_name() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join(format!("{}.exe", "a".repeat(240)));
        std::fs::write(&src, b"MZ").unwrap();

        let staged = fetch(src.to_str().unwrap(), Duration::from_secs(5)).unwrap();
        assert!(staged.to_string_lossy().ends_with(".exe"));
        assert_eq!(std::fs::read(&staged).unwrap(), b"MZ");
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/a.zip"));
        assert!(is_remote("HTTP://example.com/a.zip"));
        assert!(!is_remote("file:///tmp/a.zip"));
        assert!(!is_remote("/tmp/a.zip"));
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("setup.exe");
        std::fs::write(&src, b"MZ payload").unwrap();

        let staged = fetch(src.to_str().unwrap(), Duration::from_secs(5)).unwrap();
        assert!(staged.to_string_lossy().ends_with("-setup.exe"));
        assert_eq!(std::fs::read(&staged).unwrap(), b"MZ payload");

        let path = staged.to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_fetch_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.bin");
        std::fs::write(&src, b"abc").unwrap();

        let url = format!("file://{}", src.display());
        let staged = fetch(&url, Duration::from_secs(5)).unwrap();
        assert_eq!(std::fs::read(&staged).unwrap(), b"abc");
    }

    #[test]
    fn test_fetch_missing_local_file() {
        let err = fetch("/definitely/not/here.exe", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, InstallError::DownloadFailed { .. }));
    }
}
