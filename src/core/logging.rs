//! Per-invocation logging
//!
//! Every run writes a plain-text log named `<package>_<timestamp>.log`
//! alongside colored console output. Both sinks share one filter, taken
//! from `ROOTBEER_LOG` (EnvFilter syntax) or the verbosity flag.

use chrono::{DateTime, Local};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "ROOTBEER_LOG";

/// Log file name for `package` started at `started`.
pub fn log_file_name(package: &str, started: DateTime<Local>) -> String {
    let safe: String = package
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}.log", safe, started.format("%Y-%m-%d_%H-%M-%S"))
}

/// Install the global subscriber and create the log file.
///
/// Returns the path of the log file.
pub fn init(package: &str, log_dir: &Path, verbose: bool) -> io::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file_name(package, Local::now()));
    let file = File::create(&path)?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(io::stdout);

    let logfile = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(logfile)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(path)
}
