//! Recipe model - the JSON package descriptor.
//!
//! ```json
//! {
//!   "name": "foo",
//!   "version": "1.0",
//!   "strategy": "vendor_install",
//!   "location": "https://example.com/foo.zip",
//!   "checksum": "9f86d081884c7d65...",
//!   "installerType": "exe",
//!   "installDependencies": ["bar"],
//!   "install": "{package_file}/setup.exe /S"
//! }
//! ```
//!
//! Field names are camelCase. The snake_case spellings used by older
//! recipes (`installer_type`, `pre_install`, ...) are accepted on input.
//! Unknown fields are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{InstallError, Result};

/// How a package gets installed.
///
/// Unrecognized values are preserved so the recipe still parses; the
/// installer rejects them before doing any work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strategy {
    /// Run a vendor-provided installer (or archive) in place.
    VendorInstall,
    /// Extract an archive and run the binary installer found inside it.
    ZipInstall,
    /// Anything else, kept verbatim.
    Unsupported(String),
}

impl Strategy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::VendorInstall => "vendor_install",
            Self::ZipInstall => "zip_install",
            Self::Unsupported(s) => s.as_str(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Fail with `UnsupportedStrategy` unless this is a known strategy.
    pub fn ensure_supported(&self) -> Result<()> {
        match self {
            Self::Unsupported(s) => Err(InstallError::UnsupportedStrategy(s.clone())),
            _ => Ok(()),
        }
    }
}

impl From<String> for Strategy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "vendor_install" => Self::VendorInstall,
            "zip_install" => Self::ZipInstall,
            _ => Self::Unsupported(s),
        }
    }
}

impl From<Strategy> for String {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Unsupported(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved package recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackageDescriptor {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub strategy: Strategy,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, alias = "installer_type")]
    pub installer_type: String,
    #[serde(default, alias = "install_dependencies", deserialize_with = "null_as_empty")]
    pub install_dependencies: Vec<String>,
    #[serde(default, alias = "uninstall_dependencies", deserialize_with = "null_as_empty")]
    pub uninstall_dependencies: Vec<String>,
    #[serde(default, alias = "pre_install", skip_serializing_if = "Option::is_none")]
    pub pre_install: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,
    #[serde(default, alias = "post_install", skip_serializing_if = "Option::is_none")]
    pub post_install: Option<String>,
    #[serde(default, alias = "pre_uninstall", skip_serializing_if = "Option::is_none")]
    pub pre_uninstall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall: Option<String>,
    #[serde(default, alias = "post_uninstall", skip_serializing_if = "Option::is_none")]
    pub post_uninstall: Option<String>,
}

/// Dependency lists may be written as `null`; treat that as empty.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Script phases run around an install, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PreInstall,
    Install,
    PostInstall,
}

impl Phase {
    pub const INSTALL_ORDER: [Phase; 3] = [Phase::PreInstall, Phase::Install, Phase::PostInstall];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PreInstall => "pre-install",
            Self::Install => "install",
            Self::PostInstall => "post-install",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PackageDescriptor {
    /// Parse a recipe body. `name` is the requested package; the recipe's
    /// own `name` must match it exactly.
    pub fn from_json(name: &str, body: &str) -> Result<Self> {
        let descriptor: Self =
            serde_json::from_str(body).map_err(|e| InstallError::RecipeMalformed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        if descriptor.name.trim().is_empty() {
            return Err(InstallError::RecipeMalformed {
                name: name.to_string(),
                reason: "field `name` is empty".to_string(),
            });
        }
        if descriptor.name != name {
            return Err(InstallError::RecipeMalformed {
                name: name.to_string(),
                reason: format!("recipe declares name `{}`", descriptor.name),
            });
        }
        if descriptor.location.trim().is_empty() {
            return Err(InstallError::RecipeMalformed {
                name: name.to_string(),
                reason: "field `location` is empty".to_string(),
            });
        }

        Ok(descriptor)
    }

    /// Serialize back to pretty JSON.
    pub fn to_json(&self) -> String {
        // Only strings, string lists and options: serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Script body for a phase, if present and not blank.
    pub fn script(&self, phase: Phase) -> Option<&str> {
        let body = match phase {
            Phase::PreInstall => self.pre_install.as_deref(),
            Phase::Install => self.install.as_deref(),
            Phase::PostInstall => self.post_install.as_deref(),
        };
        body.filter(|s| !s.trim().is_empty())
    }

    /// Expected SHA-256, if the recipe declares a non-empty one.
    pub fn expected_checksum(&self) -> Option<&str> {
        self.checksum
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOO: &str = r#"{
        "name": "foo",
        "version": "1.0",
        "strategy": "vendor_install",
        "location": "https://example/foo.zip",
        "checksum": "abcd",
        "installerType": "exe",
        "install": "installer.exe /S"
    }"#;

    #[test]
    fn test_parse_minimal_recipe() {
        let pkg = PackageDescriptor::from_json("foo", FOO).unwrap();
        assert_eq!(pkg.name, "foo");
        assert_eq!(pkg.version, "1.0");
        assert_eq!(pkg.strategy, Strategy::VendorInstall);
        assert_eq!(pkg.checksum.as_deref(), Some("abcd"));
        assert_eq!(pkg.installer_type, "exe");
        assert!(pkg.install_dependencies.is_empty());
        assert!(pkg.uninstall_dependencies.is_empty());
        assert_eq!(pkg.script(Phase::Install), Some("installer.exe /S"));
        assert_eq!(pkg.script(Phase::PreInstall), None);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let body = r#"{
            "name": "bar",
            "version": "2.3",
            "strategy": "zip_install",
            "location": "https://example/bar.zip",
            "checksum": null,
            "installerType": "msi",
            "installDependencies": [],
            "uninstallDependencies": ["baz"],
            "preInstall": "echo pre",
            "install": "msiexec /i {package_file}",
            "postInstall": "echo post",
            "uninstall": "msiexec /x {package_file}"
        }"#;

        let pkg = PackageDescriptor::from_json("bar", body).unwrap();
        let json = pkg.to_json();
        assert!(json.contains("\"installDependencies\": []"));

        let again = PackageDescriptor::from_json("bar", &json).unwrap();
        assert_eq!(pkg, again);
    }

    #[test]
    fn test_snake_case_aliases() {
        let body = r#"{
            "name": "old",
            "version": "1",
            "strategy": "vendor_install",
            "location": "/tmp/old.exe",
            "checksum": null,
            "installer_type": "exe",
            "install_dependencies": ["a", "b"],
            "pre_install": "echo hi"
        }"#;
        let pkg = PackageDescriptor::from_json("old", body).unwrap();
        assert_eq!(pkg.installer_type, "exe");
        assert_eq!(pkg.install_dependencies, vec!["a", "b"]);
        assert_eq!(pkg.script(Phase::PreInstall), Some("echo hi"));
    }

    #[test]
    fn test_null_dependencies_are_empty() {
        let body = r#"{"name":"n","strategy":"zip_install","location":"x.zip","installDependencies":null}"#;
        let pkg = PackageDescriptor::from_json("n", body).unwrap();
        assert!(pkg.install_dependencies.is_empty());
    }

    #[test]
    fn test_unknown_strategy_parses_but_is_unsupported() {
        let body = r#"{"name":"u","strategy":"unknown_strategy","location":"x"}"#;
        let pkg = PackageDescriptor::from_json("u", body).unwrap();
        assert_eq!(pkg.strategy, Strategy::Unsupported("unknown_strategy".into()));
        assert!(!pkg.strategy.is_supported());
        assert!(matches!(
            pkg.strategy.ensure_supported(),
            Err(InstallError::UnsupportedStrategy(s)) if s == "unknown_strategy"
        ));
        assert!(pkg.to_json().contains("\"strategy\": \"unknown_strategy\""));
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let body = r#"{"name":"x","strategy":"vendor_install"}"#;
        let err = PackageDescriptor::from_json("x", body).unwrap_err();
        assert!(matches!(err, InstallError::RecipeMalformed { .. }));
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_name_must_match_request() {
        let err = PackageDescriptor::from_json("bar", FOO).unwrap_err();
        match err {
            InstallError::RecipeMalformed { name, reason } => {
                assert_eq!(name, "bar");
                assert!(reason.contains("`foo`"), "reason: {reason}");
            }
            other => panic!("expected RecipeMalformed, got {other:?}"),
        }

        let padded = r#"{"name":" foo ","strategy":"vendor_install","location":"y"}"#;
        assert!(PackageDescriptor::from_json("foo", padded).is_err());
    }

    #[test]
    fn test_unknown_field_is_malformed() {
        let body = r#"{"name":"x","strategy":"vendor_install","location":"y","colour":"red"}"#;
        let err = PackageDescriptor::from_json("x", body).unwrap_err();
        assert!(matches!(err, InstallError::RecipeMalformed { .. }));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let body = r#"{"name":"x","strategy":"vendor_install","location":"y","installDependencies":"z"}"#;
        assert!(matches!(
            PackageDescriptor::from_json("x", body),
            Err(InstallError::RecipeMalformed { .. })
        ));
    }

    #[test]
    fn test_blank_scripts_are_skipped() {
        let body = r#"{"name":"x","strategy":"vendor_install","location":"y","preInstall":"  \n"}"#;
        let pkg = PackageDescriptor::from_json("x", body).unwrap();
        assert_eq!(pkg.script(Phase::PreInstall), None);
    }

    #[test]
    fn test_expected_checksum_ignores_blank() {
        let mut pkg = PackageDescriptor::from_json("foo", FOO).unwrap();
        pkg.checksum = Some("   ".into());
        assert_eq!(pkg.expected_checksum(), None);
        pkg.checksum = Some(" ABCD ".into());
        assert_eq!(pkg.expected_checksum(), Some("ABCD"));
    }
}
