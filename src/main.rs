//! django-setting's main application entry point.
//! Parses the command line and dispatches to the selected command.

use django_setting::{
    cli::{get_args, Args, Command},
    config::Settings,
    docker::{self, DockerCli, FailurePolicy, ImageBuilder},
    error::{default_error_handler, Result},
    layout::ProjectLayout,
    logger::init_logger,
    project::{self, StartOptions},
    prompt::DialoguerPrompter,
    renderer::MiniJinjaRenderer,
    settings::{self, Mode, SettingsOptions},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the project layout from the working directory
/// 2. Runs the selected command with a terminal prompter
fn run(args: Args) -> Result<()> {
    let workdir = match args.directory {
        Some(directory) => directory,
        None => std::env::current_dir()?,
    };
    let layout = ProjectLayout::new(&workdir, args.command.project_name());
    let prompt = DialoguerPrompter::new();

    match args.command {
        Command::Startproject(start) => {
            let options = StartOptions { force: start.force, python: start.python };
            project::start(&layout, &options, &prompt)
        }
        Command::Docker(build) => {
            layout.require_project()?;
            let engine = MiniJinjaRenderer::new();
            let settings = Settings::load(&layout)?;
            let cli = DockerCli::new(build.docker_bin, &layout.project_dir);
            let builder: Option<&dyn ImageBuilder> = if build.no_build { None } else { Some(&cli) };
            let policy =
                if build.keep_going { FailurePolicy::Continue } else { FailurePolicy::Abort };

            let report = docker::run(&layout, &settings, &prompt, &engine, builder, policy)?;
            print!("{}", report);
            report.into_result().map(|_| ())
        }
        Command::Settings(collect) => {
            let options = SettingsOptions {
                mode: collect.deploy.then_some(Mode::Deploy),
                reset_config: collect.reset_config,
                encrypt: collect.encrypt,
            };
            settings::run(&layout, &options, &prompt)
        }
        Command::Removeproject(remove) => {
            project::remove(&layout, remove.yes, &prompt).map(|_| ())
        }
    }
}
