//! External process invocation.
//! Every command is fire-and-wait with inherited or captured output.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// Human readable rendering of a command line, used in messages.
pub fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
    parts.extend(command.get_args().map(|arg| arg.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Runs `command` with inherited stdio and returns its exit status.
///
/// # Errors
/// * `Error::CommandError` if the process cannot be started
pub fn run_status(command: &mut Command) -> Result<ExitStatus> {
    let description = describe(command);
    debug!("Running '{}'", description);

    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::CommandError { command: description, reason: e.to_string() })
}

/// Runs `command` and fails unless it exits successfully.
pub fn run_checked(command: &mut Command) -> Result<()> {
    let status = run_status(command)?;
    if !status.success() {
        return Err(Error::CommandError {
            command: describe(command),
            reason: format!("exited with status: {}", status),
        });
    }
    Ok(())
}

/// Runs `command` quietly; output is discarded unless it fails.
pub fn run_quiet(command: &mut Command) -> Result<()> {
    capture_output(command).map(|_| ())
}

/// Runs `command`, captures stdout and fails unless it exits successfully.
pub fn capture_output(command: &mut Command) -> Result<String> {
    let description = describe(command);
    debug!("Capturing '{}'", description);

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::CommandError { command: description.clone(), reason: e.to_string() })?;

    if !output.status.success() {
        return Err(Error::CommandError {
            command: description,
            reason: format!(
                "exited with status: {} ({})",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Returns true when `tool` is an executable file on PATH.
pub fn is_installed<S: AsRef<OsStr>>(tool: S) -> bool {
    let tool = tool.as_ref();
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(tool))))
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Fails with `Error::MissingToolError` unless every tool is on PATH.
pub fn require_tools(tools: &[&str]) -> Result<()> {
    for tool in tools {
        if !is_installed(tool) {
            return Err(Error::MissingToolError { tool: tool.to_string() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut command = Command::new("docker");
        command.args(["build", ".", "-t", "app-base-00-alpine"]);
        assert_eq!(describe(&command), "docker build . -t app-base-00-alpine");
    }

    #[test]
    fn test_missing_tool() {
        let result = require_tools(&["surely-not-an-installed-tool-8d1f"]);
        assert!(matches!(result, Err(Error::MissingToolError { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_reports_exit_status() {
        assert!(run_checked(&mut Command::new("true")).is_ok());
        assert!(matches!(
            run_checked(&mut Command::new("false")),
            Err(Error::CommandError { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_output() {
        let mut command = Command::new("echo");
        command.arg("3.11.4");
        assert_eq!(capture_output(&mut command).unwrap().trim(), "3.11.4");
    }
}
