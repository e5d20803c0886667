//! Installer error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::helpers::template::TemplateError;

/// Errors that can occur while resolving, acquiring, or installing a package.
///
/// Every error is fatal for the install that raised it; nothing retries.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("recipe '{name}' not found at {location}: {reason}")]
    RecipeNotFound {
        name: String,
        location: String,
        reason: String,
    },

    #[error("recipe '{name}' is malformed: {reason}")]
    RecipeMalformed { name: String, reason: String },

    #[error("download failed: {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("extraction failed for {archive}: {reason}")]
    ExtractionFailed { archive: String, reason: String },

    #[error("no installer (.exe, .msi, .dmg, .pkg) found under {}", dir.display())]
    InstallerNotFound { dir: PathBuf },

    #[error("unsupported installation strategy '{0}'")]
    UnsupportedStrategy(String),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("{phase} script failed (exit code: {code:?})\nstderr: {stderr}")]
    ScriptExecutionFailed {
        phase: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("dependency '{dependency}' of '{package}' failed to install")]
    DependencyInstallFailed {
        package: String,
        dependency: String,
        #[source]
        source: Box<InstallError>,
    },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("installation of '{name}' failed")]
    Package {
        name: String,
        #[source]
        source: Box<InstallError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = InstallError> = std::result::Result<T, E>;

impl InstallError {
    /// Attach the failing package's name.
    ///
    /// Errors that already name their package are returned unchanged.
    pub fn for_package(self, name: &str) -> Self {
        match self {
            e @ (Self::Package { .. } | Self::DependencyInstallFailed { .. }) => e,
            other => Self::Package {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The error that started it all, with package wrappers peeled off.
    pub fn root_cause(&self) -> &InstallError {
        match self {
            Self::Package { source, .. } | Self::DependencyInstallFailed { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Package named by the outermost wrapper, if any.
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Package { name, .. } => Some(name),
            Self::DependencyInstallFailed { package, .. } => Some(package),
            _ => None,
        }
    }

    /// Short label for the phase that failed, used in user-facing reports.
    pub fn phase(&self) -> &'static str {
        match self.root_cause() {
            Self::RecipeNotFound { .. } | Self::RecipeMalformed { .. } => "recipe",
            Self::DownloadFailed { .. } => "download",
            Self::ChecksumMismatch { .. } => "checksum",
            Self::ExtractionFailed { .. } => "extract",
            Self::InstallerNotFound { .. } => "discover",
            Self::UnsupportedStrategy(_) => "strategy",
            Self::Template(_) => "template",
            Self::ScriptExecutionFailed { .. } => "script",
            Self::DependencyCycle { .. } => "dependency",
            Self::Io(_) => "io",
            Self::Package { .. } | Self::DependencyInstallFailed { .. } => "install",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_package_wraps_once() {
        let err = InstallError::UnsupportedStrategy("nope".into())
            .for_package("foo")
            .for_package("bar");

        assert_eq!(err.package(), Some("foo"));
        assert!(matches!(
            err.root_cause(),
            InstallError::UnsupportedStrategy(s) if s == "nope"
        ));
    }

    #[test]
    fn test_root_cause_through_dependency() {
        let err = InstallError::DependencyInstallFailed {
            package: "app".into(),
            dependency: "lib".into(),
            source: Box::new(InstallError::ChecksumMismatch {
                expected: "aa".into(),
                actual: "bb".into(),
            }),
        };

        assert_eq!(err.package(), Some("app"));
        assert_eq!(err.phase(), "checksum");
        assert!(err.to_string().contains("'lib' of 'app'"));
    }

    #[test]
    fn test_cycle_message_lists_path() {
        let err = InstallError::DependencyCycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
    }
}
