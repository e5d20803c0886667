//! Installer settings
//!
//! Resolved as defaults, then environment, then command-line flags (the
//! binary overrides fields after [`Config::from_env`]).
//!
//! | variable                    | default | range       |
//! |-----------------------------|---------|-------------|
//! | `ROOTBEER_RECIPES`          | GitHub recipe repository | |
//! | `ROOTBEER_LOG_DIR`          | `.`     |             |
//! | `ROOTBEER_HTTP_TIMEOUT`     | 30s     | 5 - 300     |
//! | `ROOTBEER_DOWNLOAD_TIMEOUT` | 600s    | 30 - 3600   |

use std::path::PathBuf;
use std::time::Duration;

/// Where recipes are fetched from unless overridden.
pub const DEFAULT_RECIPES: &str =
    "https://raw.githubusercontent.com/MuhammadButt1995/recipes/master";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Recipe base location: an http(s) URL or a local directory.
    pub recipes: String,
    /// Directory that receives the per-invocation log file.
    pub log_dir: PathBuf,
    /// Timeout for recipe fetches.
    pub http_timeout: Duration,
    /// Timeout for artifact downloads.
    pub download_timeout: Duration,
    /// Plan and report only; no downloads or scripts.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recipes: DEFAULT_RECIPES.to_string(),
            log_dir: PathBuf::from("."),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            dry_run: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with `ROOTBEER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            recipes: lookup("ROOTBEER_RECIPES")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.recipes),
            log_dir: lookup("ROOTBEER_LOG_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            http_timeout: timeout_secs(
                lookup("ROOTBEER_HTTP_TIMEOUT"),
                DEFAULT_HTTP_TIMEOUT_SECS,
                5,
                300,
            ),
            download_timeout: timeout_secs(
                lookup("ROOTBEER_DOWNLOAD_TIMEOUT"),
                DEFAULT_DOWNLOAD_TIMEOUT_SECS,
                30,
                3600,
            ),
            dry_run: false,
        }
    }
}

/// Parse a timeout in seconds, falling back to `default` and clamping.
fn timeout_secs(raw: Option<String>, default: u64, min: u64, max: u64) -> Duration {
    let secs = raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_secs(secs.clamp(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let cfg = Config::from_lookup(lookup(&[]));
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("ROOTBEER_RECIPES", "/srv/recipes"),
            ("ROOTBEER_LOG_DIR", "/var/log/rootbeer"),
            ("ROOTBEER_HTTP_TIMEOUT", "12"),
        ]));
        assert_eq!(cfg.recipes, "/srv/recipes");
        assert_eq!(cfg.log_dir, PathBuf::from("/var/log/rootbeer"));
        assert_eq!(cfg.http_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_timeouts_are_clamped() {
        let cfg = Config::from_lookup(lookup(&[
            ("ROOTBEER_HTTP_TIMEOUT", "1"),
            ("ROOTBEER_DOWNLOAD_TIMEOUT", "999999"),
        ]));
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
        assert_eq!(cfg.download_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_garbage_timeout_uses_default() {
        let cfg = Config::from_lookup(lookup(&[("ROOTBEER_HTTP_TIMEOUT", "soon")]));
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
    }
}
