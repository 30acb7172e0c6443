//! The `startproject` and `removeproject` commands.

use std::fs;

use log::{debug, warn};
use serde_json::Value;

use crate::command::{capture_output, is_installed, require_tools, run_quiet};
use crate::config::{install_default_config, Settings, Tier};
use crate::constants::{DJANGO_CONFIG_PACKAGE, DJANGO_DIR, PROJECT_SUBDIRS};
use crate::error::{Error, Result};
use crate::git;
use crate::layout::ProjectLayout;
use crate::prompt::Prompter;
use crate::settings::object_at;

pub mod django;
pub mod pyenv;

use pyenv::Pyenv;

const GITIGNORE: &str = include_str!("../../assets/gitignore");
const PACKAGES: [&str; 3] = ["django", "django_extensions", "ipython"];

#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Replace an existing project directory without asking
    pub force: bool,
    /// Python version to use instead of asking
    pub python: Option<String>,
}

fn step(name: &str) {
    println!("- {}", name);
}

/// Creates an empty project directory, replacing an existing one when allowed.
///
/// # Errors
/// * `Error::ProjectExistsError` if the directory exists and the operator declines
pub fn make_project_dir(
    layout: &ProjectLayout,
    force: bool,
    prompter: &dyn Prompter,
) -> Result<()> {
    let project_dir = &layout.project_dir;
    if project_dir.exists() {
        let replace = prompter.confirm(
            force,
            format!("Project directory '{}' already exists. Replace it?", project_dir.display()),
        )?;
        if !replace {
            return Err(Error::ProjectExistsError {
                project_dir: project_dir.display().to_string(),
            });
        }
        debug!("Removing existing {}", project_dir.display());
        fs::remove_dir_all(project_dir)?;
    }
    fs::create_dir_all(project_dir)?;
    Ok(())
}

/// Creates the hidden project directories and the `.gitignore`.
pub fn create_structure(layout: &ProjectLayout) -> Result<()> {
    for dir in PROJECT_SUBDIRS {
        fs::create_dir_all(layout.project_dir.join(dir))?;
    }
    fs::write(layout.project_dir.join(".gitignore"), GITIGNORE)?;
    Ok(())
}

/// Turns `config/settings.py` into a `settings` package and returns the
/// secret key removed from it.
pub fn split_settings(layout: &ProjectLayout) -> Result<String> {
    let config_dir = layout.django_config_dir();
    let settings_file = config_dir.join("settings.py");
    let original = fs::read_to_string(&settings_file)?;

    let (secret_key, settings) = django::extract_secret_key(&original)?;
    let base = django::rewrite_settings(&settings, &layout.project_name)?;

    let settings_dir = layout.django_settings_dir();
    fs::create_dir_all(&settings_dir)?;
    fs::write(settings_dir.join("__init__.py"), django::SETTINGS_INIT)?;
    fs::write(settings_dir.join("base.py"), base)?;
    fs::write(settings_dir.join("debug.py"), django::SETTINGS_DEBUG)?;
    fs::write(settings_dir.join("deploy.py"), django::SETTINGS_DEPLOY)?;
    fs::remove_file(settings_file)?;
    Ok(secret_key)
}

/// Stores `django.secret_key` in the secret common tier, keeping other keys.
pub fn store_secret_key(layout: &ProjectLayout, secret_key: &str) -> Result<()> {
    let mut settings = Settings::load(layout)?;
    object_at(settings.tier_mut(Tier::Common), &["django"])
        .insert("secret_key".to_string(), Value::String(secret_key.to_string()));
    settings.save(layout)
}

fn install_django(layout: &ProjectLayout, env: &Pyenv) -> Result<()> {
    let project_dir = &layout.project_dir;
    let mut install = vec!["install"];
    install.extend(PACKAGES);
    run_quiet(&mut env.command(project_dir, "pip", &install))?;
    let startproject = ["startproject", DJANGO_CONFIG_PACKAGE];
    run_quiet(&mut env.command(project_dir, "django-admin", &startproject))?;

    let requirements = capture_output(&mut env.command(project_dir, "pip", &["freeze"]))?;
    fs::write(project_dir.join(".requirements").join("debug.txt"), requirements)?;

    fs::rename(project_dir.join(DJANGO_CONFIG_PACKAGE), project_dir.join(DJANGO_DIR))?;
    Ok(())
}

fn create_apps(layout: &ProjectLayout, env: &Pyenv) -> Result<()> {
    let django_dir = &layout.django_dir;
    fs::create_dir_all(django_dir.join("templates"))?;
    fs::create_dir_all(django_dir.join("static"))?;
    run_quiet(&mut env.command(django_dir, "python", &["manage.py", "startapp", "member"]))?;
    fs::write(django_dir.join("member").join("models.py"), django::MEMBER_MODELS)?;
    Ok(())
}

/// Runs the `startproject` command.
pub fn start(
    layout: &ProjectLayout,
    options: &StartOptions,
    prompter: &dyn Prompter,
) -> Result<()> {
    step("Check requirements");
    require_tools(&["pyenv", "pyenv-virtualenv"])?;
    let version = match &options.python {
        Some(version) => version.clone(),
        None => pyenv::select_version(prompter, &pyenv::installed_versions()?)?,
    };

    step("Make project directory");
    make_project_dir(layout, options.force, prompter)?;

    step("pyenv process");
    let env = pyenv::create_virtualenv(&version, &layout.env_name, &layout.project_dir)?;

    step("Project structure process");
    create_structure(layout)?;
    install_django(layout, &env)?;

    step("Django structure process");
    create_apps(layout, &env)?;

    step("Manage Django settings");
    let secret_key = split_settings(layout)?;

    step("Manage Django config files");
    store_secret_key(layout, &secret_key)?;
    for path in install_default_config(layout, false)? {
        debug!("Installed {}", path.display());
    }

    step("Finishing");
    for manage in ["makemigrations", "migrate"] {
        run_quiet(&mut env.command(&layout.django_dir, "python", &["manage.py", manage]))?;
    }
    git::init_and_commit(&layout.project_dir, "First commit")?;

    println!("Project {} created in {}", layout.project_name, layout.project_dir.display());
    Ok(())
}

/// Runs the `removeproject` command. Returns false when the operator declines.
pub fn remove(layout: &ProjectLayout, yes: bool, prompter: &dyn Prompter) -> Result<bool> {
    layout.require_project()?;
    let confirmed = prompter.confirm(
        yes,
        format!(
            "Do you want to clear \"{}\" project folder and \"{}\" virtual environment?",
            layout.project_name, layout.env_name
        ),
    )?;
    if !confirmed {
        return Ok(false);
    }

    fs::remove_dir_all(&layout.project_dir)?;
    if is_installed("pyenv") {
        pyenv::uninstall(&layout.env_name)?;
    } else {
        warn!("pyenv not found, virtualenv '{}' was not removed", layout.env_name);
    }
    println!("Remove project {} complete", layout.project_name);
    Ok(true)
}
