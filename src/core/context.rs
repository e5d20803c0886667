//! Format context for install scripts
//!
//! Platform paths are computed once when the installer starts and handed
//! to every component that renders scripts. Nothing reads them from
//! globals.

use std::path::{Path, PathBuf};

use crate::helpers::template::Variables;
use crate::recipe::PackageDescriptor;

const UNIX_SYSTEM_PATH: &str = "/Applications";
const WINDOWS_SYSTEM_PATH: &str = "C:\\Program Files";
const WINDOWS_SYSTEM_PATH_X86: &str = "C:\\Program Files (x86)";

/// Environment-derived variables available to every script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContext {
    /// Current user's home directory.
    pub user_path: PathBuf,
    /// System application directory.
    pub system_path: PathBuf,
    /// Secondary (32-bit) application directory, Windows only.
    pub system_path_x86: Option<PathBuf>,
}

impl FormatContext {
    /// Detect paths for the running platform.
    pub fn detect() -> Self {
        let user_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        if cfg!(windows) {
            let system_path = std::env::var_os("ProgramFiles")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(WINDOWS_SYSTEM_PATH));
            let system_path_x86 = std::env::var_os("ProgramFiles(x86)")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(WINDOWS_SYSTEM_PATH_X86));
            Self {
                user_path,
                system_path,
                system_path_x86: Some(system_path_x86),
            }
        } else {
            Self {
                user_path,
                system_path: PathBuf::from(UNIX_SYSTEM_PATH),
                system_path_x86: None,
            }
        }
    }

    /// Variables for one script phase of `package`.
    ///
    /// `package_file` is the artifact (or discovered installer) the scripts
    /// operate on; `extract_dir` is only bound for archive installs.
    pub fn variables(
        &self,
        package: &PackageDescriptor,
        package_file: &Path,
        extract_dir: Option<&Path>,
    ) -> Variables {
        let mut vars = Variables::new();
        vars.insert("package_name".into(), package.name.clone());
        vars.insert("package_version".into(), package.version.clone());
        vars.insert("package_file".into(), display(package_file));
        vars.insert("user_path".into(), display(&self.user_path));
        vars.insert("system_path".into(), display(&self.system_path));
        if let Some(x86) = &self.system_path_x86 {
            vars.insert("system_path_x86".into(), display(x86));
        }
        if let Some(dir) = extract_dir {
            vars.insert("extract_dir".into(), display(dir));
        }
        vars
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
