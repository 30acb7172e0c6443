//! Error handling for django-setting.
//! Defines the error type and result alias used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for django-setting operations.
///
/// This enum represents all possible errors that can occur within the application.
/// It implements the standard Error trait through thiserror's derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents malformed JSON in a settings file
    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// Represents errors raised by the template engine
    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors raised by libgit2
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// Represents terminal errors raised while prompting the operator
    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// A category directory or fragment file does not follow the naming convention.
    /// The layer tree cannot be trusted, so the whole run is aborted.
    #[error("Malformed name '{name}' in '{parent}': expected '{expected}'.")]
    MalformedNameError { name: String, parent: String, expected: String },

    /// An option with several sub-options was asked for its unique sub-option.
    #[error(
        "Option {option} of category '{category}' has {count} sub-options and requires a selection."
    )]
    SelectionRequiredError { category: String, option: String, count: usize },

    /// A downstream step ran while an option still had no selected sub-option.
    #[error("Option {option} of category '{category}' has no selected sub-option.")]
    IncompleteSelectionError { category: String, option: String },

    /// The docker configuration tree contains no selectable layer.
    #[error("No docker layers found in '{docker_dir}'.")]
    EmptyChainError { docker_dir: String },

    /// Represents errors that occur during configuration parsing or validation
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors that occur while locating or reading templates
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// An external command could not be started or exited unsuccessfully.
    #[error("Command '{command}' failed: {reason}.")]
    CommandError { command: String, reason: String },

    /// One or more links of a docker chain failed to build.
    #[error("{failed} of {total} image build(s) failed.")]
    BuildFailedError { failed: usize, total: usize },

    /// A required external tool is not on PATH.
    #[error("'{tool}' must be installed.")]
    MissingToolError { tool: String },

    #[error("Project directory '{project_dir}' already exists. Use --force to replace it.")]
    ProjectExistsError { project_dir: String },

    #[error("Project directory '{project_dir}' does not exist.")]
    ProjectNotFoundError { project_dir: String },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
