//! Recipe resolution
//!
//! A recipe named `foo` lives at `<base>/foo.json`. The base is either an
//! http(s) URL or a local directory (`file://` URLs and plain paths).
//! Resolvers do not cache: each call is a fresh read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{InstallError, Result};
use crate::recipe::PackageDescriptor;

const USER_AGENT: &str = concat!("rootbeer/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a package name into a descriptor.
pub trait RecipeSource {
    /// Fetch and parse the recipe for `name`.
    fn resolve(&self, name: &str) -> Result<PackageDescriptor>;

    /// Human-readable location of the recipes, for logs.
    fn location(&self) -> String;
}

impl<T: RecipeSource + ?Sized> RecipeSource for &T {
    fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        (**self).resolve(name)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

impl<T: RecipeSource + ?Sized> RecipeSource for Box<T> {
    fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        (**self).resolve(name)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Pick a source for `base`: http(s) URLs go over the network, everything
/// else is treated as a directory.
pub fn source_for(base: &str, timeout: Duration) -> Box<dyn RecipeSource> {
    let lower = base.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(HttpRecipeSource::new(base, timeout))
    } else {
        let dir = base.strip_prefix("file://").unwrap_or(base);
        Box::new(DirRecipeSource::new(dir))
    }
}

/// Reject names that would escape the recipe base.
fn check_name(name: &str, location: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(InstallError::RecipeNotFound {
            name: name.to_string(),
            location: location.to_string(),
            reason: "invalid package name".to_string(),
        });
    }
    Ok(())
}

/// Recipes served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpRecipeSource {
    base_url: String,
    timeout: Duration,
}

impl HttpRecipeSource {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// URL of the recipe for `name`.
    pub fn recipe_url(&self, name: &str) -> String {
        format!("{}/{}.json", self.base_url, name)
    }
}

impl RecipeSource for HttpRecipeSource {
    fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        check_name(name, &self.base_url)?;
        let url = self.recipe_url(name);
        tracing::debug!("fetching recipe {}", url);

        let not_found = |reason: String| InstallError::RecipeNotFound {
            name: name.to_string(),
            location: url.clone(),
            reason,
        };

        let response = ureq::get(&url)
            .timeout(self.timeout)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => not_found(format!("HTTP {}", code)),
                other => not_found(other.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|e| not_found(format!("failed to read response: {}", e)))?;

        PackageDescriptor::from_json(name, &body)
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }
}

/// Recipes stored as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirRecipeSource {
    dir: PathBuf,
}

impl DirRecipeSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn recipe_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl RecipeSource for DirRecipeSource {
    fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        let location = self.location();
        check_name(name, &location)?;
        let path = self.recipe_path(name);
        tracing::debug!("reading recipe {}", path.display());

        let body = std::fs::read_to_string(&path).map_err(|e| InstallError::RecipeNotFound {
            name: name.to_string(),
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;

        PackageDescriptor::from_json(name, &body)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}
