//! JSON recipe based package installer
//!
//! A recipe is a small JSON document, fetched by name from a recipe
//! repository (an http(s) base URL or a local directory), that says where a
//! package's artifact lives and which scripts install it.
//!
//! # Example Recipe
//!
//! ```json
//! {
//!   "name": "notepad-plus",
//!   "version": "8.6.2",
//!   "strategy": "vendor_install",
//!   "location": "https://example.com/npp.8.6.2.Installer.x64.exe",
//!   "checksum": "c0ffee...",
//!   "installDependencies": ["vcredist"],
//!   "install": "& \"{package_file}\" /S"
//! }
//! ```
//!
//! # Strategies
//!
//! - `vendor_install` - download (and unpack, for known archive formats)
//!   the artifact, then run the scripts with `{package_file}` pointing at it
//! - `zip_install` - download and extract a zip, find the `.exe`, `.msi`,
//!   `.dmg` or `.pkg` inside and run the scripts with `{package_file}`
//!   pointing at that binary and `{extract_dir}` at the extraction root
//!
//! # Variables Available in Scripts
//!
//! - `package_file` - artifact or discovered installer binary
//! - `extract_dir` - extraction root (`zip_install` only)
//! - `package_name`, `package_version` - from the recipe
//! - `user_path` - the current user's home directory
//! - `system_path` - `/Applications`, or `%ProgramFiles%` on Windows
//! - `system_path_x86` - `%ProgramFiles(x86)%` (Windows only)
//!
//! Dependencies listed in `installDependencies` are installed first,
//! depth-first, each at most once.

pub mod core;
pub mod helpers;
pub mod installer;
pub mod recipe;
pub mod resolver;

pub use crate::core::config::Config;
pub use crate::core::context::FormatContext;
pub use crate::core::error::{InstallError, Result};
pub use crate::core::{logging, output};
pub use crate::helpers::acquire::{Artifact, Pipeline};
pub use crate::helpers::script::{ScriptRunner, ShellExecutor};
pub use crate::installer::Installer;
pub use crate::recipe::{PackageDescriptor, Phase, Strategy};
pub use crate::resolver::{DirRecipeSource, HttpRecipeSource, RecipeSource};
