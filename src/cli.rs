//! Command-line interface implementation for django-setting.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for django-setting.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "django-setting: Django project scaffolding with layered docker builds",
    long_about = None
)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing the project (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a Django project with its virtualenv, settings and docker layers
    Startproject(StartProjectArgs),
    /// Render and build the docker image chain of a project
    Docker(DockerArgs),
    /// Fill in the public and secret settings of a project
    Settings(SettingsArgs),
    /// Delete a project directory and its virtualenv
    Removeproject(RemoveProjectArgs),
}

#[derive(ClapArgs, Debug)]
pub struct StartProjectArgs {
    #[arg(value_name = "PROJECT_NAME")]
    pub project_name: String,

    /// Replace an existing project directory without asking
    #[arg(short, long)]
    pub force: bool,

    /// Python version to create the virtualenv with
    #[arg(long, value_name = "VERSION")]
    pub python: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct DockerArgs {
    #[arg(value_name = "PROJECT_NAME")]
    pub project_name: String,

    /// Attempt every link even after a failed build
    #[arg(long)]
    pub keep_going: bool,

    /// Only render the Dockerfiles, do not build images
    #[arg(long)]
    pub no_build: bool,

    /// Docker executable used for builds
    #[arg(long, value_name = "BIN", default_value = "docker")]
    pub docker_bin: String,
}

#[derive(ClapArgs, Debug)]
pub struct SettingsArgs {
    #[arg(value_name = "PROJECT_NAME")]
    pub project_name: String,

    /// Collect deploy settings without asking for the mode
    #[arg(long)]
    pub deploy: bool,

    /// Archive and encrypt the secret settings with travis afterwards
    #[arg(long)]
    pub encrypt: bool,

    /// Overwrite the .config tree with the bundled defaults
    #[arg(long)]
    pub reset_config: bool,
}

#[derive(ClapArgs, Debug)]
pub struct RemoveProjectArgs {
    #[arg(value_name = "PROJECT_NAME")]
    pub project_name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl Command {
    pub fn project_name(&self) -> &str {
        match self {
            Command::Startproject(args) => &args.project_name,
            Command::Docker(args) => &args.project_name,
            Command::Settings(args) => &args.project_name,
            Command::Removeproject(args) => &args.project_name,
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments or the subcommand are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::MissingRequiredArgument
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            }
            _ => e.exit(),
        },
    }
}
