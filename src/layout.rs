//! Paths of a scaffolded project.
//! Every path is derived once from the working directory and the project name.

use std::path::{Path, PathBuf};

use crate::constants::{
    CANONICAL_DOCKERFILE, CONFIG_DIR, CONFIG_SECRET_DIR, DJANGO_CONFIG_PACKAGE, DJANGO_DIR,
    DOCKERFILES_DIR, DOCKER_DIR, ENV_SUFFIX, SETTINGS_COMMON_FILE, SETTINGS_DEBUG_FILE,
    SETTINGS_DEPLOY_FILE, SETTINGS_PUBLIC_FILE,
};
use crate::error::{Error, Result};

/// Filesystem layout of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub project_name: String,
    pub env_name: String,
    pub workdir: PathBuf,
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub docker_dir: PathBuf,
    pub secret_dir: PathBuf,
    pub dockerfiles_dir: PathBuf,
    pub django_dir: PathBuf,
}

impl ProjectLayout {
    /// Creates the layout of `project_name` located inside `workdir`.
    pub fn new<P: AsRef<Path>, S: Into<String>>(workdir: P, project_name: S) -> Self {
        let project_name = project_name.into();
        let workdir = workdir.as_ref().to_path_buf();
        let project_dir = workdir.join(&project_name);
        let config_dir = project_dir.join(CONFIG_DIR);

        Self {
            env_name: format!("{project_name}{ENV_SUFFIX}"),
            docker_dir: config_dir.join(DOCKER_DIR),
            secret_dir: project_dir.join(CONFIG_SECRET_DIR),
            dockerfiles_dir: project_dir.join(DOCKERFILES_DIR),
            django_dir: project_dir.join(DJANGO_DIR),
            config_dir,
            project_dir,
            workdir,
            project_name,
        }
    }

    /// Fails with `Error::ProjectNotFoundError` unless the project directory exists.
    pub fn require_project(&self) -> Result<()> {
        if !self.project_dir.is_dir() {
            return Err(Error::ProjectNotFoundError {
                project_dir: self.project_dir.display().to_string(),
            });
        }
        Ok(())
    }

    pub fn public_settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_PUBLIC_FILE)
    }

    pub fn secret_common_file(&self) -> PathBuf {
        self.secret_dir.join(SETTINGS_COMMON_FILE)
    }

    pub fn secret_debug_file(&self) -> PathBuf {
        self.secret_dir.join(SETTINGS_DEBUG_FILE)
    }

    pub fn secret_deploy_file(&self) -> PathBuf {
        self.secret_dir.join(SETTINGS_DEPLOY_FILE)
    }

    /// `django_app/config`, the package holding `settings`, `urls` and `wsgi`.
    pub fn django_config_dir(&self) -> PathBuf {
        self.django_dir.join(DJANGO_CONFIG_PACKAGE)
    }

    pub fn django_settings_dir(&self) -> PathBuf {
        self.django_config_dir().join("settings")
    }

    pub fn canonical_dockerfile(&self) -> PathBuf {
        self.project_dir.join(CANONICAL_DOCKERFILE)
    }
}
