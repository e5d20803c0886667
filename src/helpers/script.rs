//! Install script execution
//!
//! A phase script is rendered against its variables, written to a
//! temporary file and run under the platform shell:
//!
//! - Unix: `sh <file>`
//! - Windows: `powershell -NoProfile -ExecutionPolicy Unrestricted -File <file>`
//!
//! Stdin is closed. Output is captured and forwarded to the log, stdout at
//! debug level and stderr at warn level, so a failing phase leaves its
//! diagnostics in the per-run log file.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::core::error::{InstallError, Result};
use crate::helpers::template::{self, Variables};
use crate::recipe::Phase;

/// Runs one script phase.
///
/// The installer only talks to this trait, so tests can swap in a runner
/// that records what would have executed.
pub trait ScriptRunner {
    fn run(&self, phase: Phase, body: &str, vars: &Variables) -> Result<()>;
}

impl<T: ScriptRunner + ?Sized> ScriptRunner for &T {
    fn run(&self, phase: Phase, body: &str, vars: &Variables) -> Result<()> {
        (**self).run(phase, body, vars)
    }
}

/// Runs scripts with the host's native shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptRunner for ShellExecutor {
    fn run(&self, phase: Phase, body: &str, vars: &Variables) -> Result<()> {
        // Rendering happens first so a bad placeholder never touches disk.
        let script = template::render(body, vars)?;

        let mut file = tempfile::Builder::new()
            .prefix("rootbeer_")
            .suffix(SCRIPT_SUFFIX)
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.flush()?;
        // Release the handle; Windows refuses to run a file that is still open.
        let path = file.into_temp_path();

        tracing::debug!("running {} script {}", phase, path.display());
        let output = shell_command(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| InstallError::ScriptExecutionFailed {
                phase: phase.name().to_string(),
                code: None,
                stderr: format!("failed to start shell: {}", e),
            })?;

        log_output(phase, &output);

        if !output.status.success() {
            return Err(InstallError::ScriptExecutionFailed {
                phase: phase.name().to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        path.close()?;
        Ok(())
    }
}

#[cfg(windows)]
const SCRIPT_SUFFIX: &str = ".ps1";
#[cfg(not(windows))]
const SCRIPT_SUFFIX: &str = ".sh";

#[cfg(windows)]
fn shell_command(script: &Path) -> Command {
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-ExecutionPolicy", "Unrestricted", "-File"])
        .arg(script);
    cmd
}

#[cfg(not(windows))]
fn shell_command(script: &Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg(script);
    cmd
}

fn log_output(phase: Phase, output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::debug!("[{}] {}", phase, line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        tracing::warn!("[{}] {}", phase, line);
    }
}
