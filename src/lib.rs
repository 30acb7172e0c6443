//! django-setting scaffolds Django projects and builds their docker images
//! as a chain of layers selected from a configuration tree.

/// Command-line interface module for the django-setting application
pub mod cli;

/// External process invocation
pub mod command;

/// Tiered JSON settings and the bundled default configuration
pub mod config;

pub mod constants;

/// Layer discovery, selection and chain builds
/// Reads the tree under `.config/docker`:
/// - `NN.category/`
/// - `NN.category/NN.option.docker`
pub mod docker;

/// Error types and handling for the django-setting application
pub mod error;

pub mod git;

/// Paths derived from the working directory and project name
pub mod layout;

pub mod logger;

/// Project creation and removal
pub mod project;

/// User input and interaction handling
pub mod prompt;

/// Template rendering for the docker chain
pub mod renderer;

/// Interactive collection of settings values
pub mod settings;
