//! pyenv and pyenv-virtualenv integration.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use regex::Regex;

use crate::command::{capture_output, run_quiet};
use crate::error::{Error, Result};
use crate::prompt::{choose, parse_number, InputError, Menu, Prompter};

/// Python versions offered by `pyenv versions`: 3.x interpreters only,
/// virtualenvs excluded.
pub fn parse_versions(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| {
            let line = match line.find(" (set by") {
                Some(at) => &line[..at],
                None => line,
            };
            line.replace('*', "").trim().to_string()
        })
        .filter(|line| line.starts_with('3') && !line.contains('/'))
        .collect()
}

/// Location of `env_name` in the output of `pyenv virtualenvs`.
pub fn parse_virtualenv_path(output: &str, env_name: &str) -> Option<PathBuf> {
    let pattern = Regex::new(r"^\s*\*?\s*(\S+)\s+\(created from\s+(.+?)\)").ok()?;
    output.lines().find_map(|line| {
        let captures = pattern.captures(line)?;
        if &captures[1] != env_name {
            return None;
        }
        Some(Path::new(&captures[2]).join("envs").join(env_name))
    })
}

/// Parses the version menu answer; empty input selects the last version.
pub fn parse_version_choice(raw: &str, count: usize) -> std::result::Result<usize, InputError> {
    if raw.trim().is_empty() && count > 0 {
        return Ok(count - 1);
    }
    parse_number(raw, 1, count).map(|number| number - 1)
}

/// Picks one of `versions`, asking only when there is more than one.
pub fn select_version(prompter: &dyn Prompter, versions: &[String]) -> Result<String> {
    match versions {
        [] => Err(Error::ConfigError("no Python 3 interpreter installed with pyenv".to_string())),
        [only] => Ok(only.clone()),
        _ => {
            let last = &versions[versions.len() - 1];
            let menu = versions.iter().enumerate().fold(
                Menu::new(
                    "Available python versions:",
                    format!("  Select python version (default: {})", last),
                ),
                |menu, (index, version)| menu.entry(index + 1, version.as_str()),
            );
            let index = choose(prompter, &menu, |raw| parse_version_choice(raw, versions.len()))?;
            Ok(versions[index].clone())
        }
    }
}

pub fn installed_versions() -> Result<Vec<String>> {
    Ok(parse_versions(&capture_output(Command::new("pyenv").arg("versions"))?))
}

/// Creates `env_name` from `version` and makes it local to `project_dir`.
pub fn create_virtualenv(version: &str, env_name: &str, project_dir: &Path) -> Result<Pyenv> {
    run_quiet(Command::new("pyenv").args(["virtualenv", version, env_name]))?;
    run_quiet(Command::new("pyenv").current_dir(project_dir).args(["local", env_name]))?;

    let output = capture_output(Command::new("pyenv").arg("virtualenvs"))?;
    let env_path = parse_virtualenv_path(&output, env_name).ok_or_else(|| Error::CommandError {
        command: "pyenv virtualenvs".to_string(),
        reason: format!("virtualenv '{}' not listed", env_name),
    })?;
    debug!("Virtualenv {} located at {}", env_name, env_path.display());
    Ok(Pyenv::new(env_path))
}

/// `pyenv uninstall -f <env_name>`.
pub fn uninstall(env_name: &str) -> Result<()> {
    run_quiet(Command::new("pyenv").args(["uninstall", "-f", env_name]))
}

/// Runs the executables of one virtualenv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pyenv {
    env_path: PathBuf,
}

impl Pyenv {
    pub fn new<P: Into<PathBuf>>(env_path: P) -> Self {
        Self { env_path: env_path.into() }
    }

    pub fn bin(&self, program: &str) -> PathBuf {
        self.env_path.join("bin").join(program)
    }

    /// `<env>/bin/<program> <args...>` run inside `dir`.
    pub fn command(&self, dir: &Path, program: &str, args: &[&str]) -> Command {
        let mut command = Command::new(self.bin(program));
        command.current_dir(dir).args(args);
        command
    }
}
