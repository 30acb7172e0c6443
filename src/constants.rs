//! Common constants used throughout django-setting.

/// Public configuration directory inside a project
pub const CONFIG_DIR: &str = ".config";

/// Secret configuration directory inside a project
pub const CONFIG_SECRET_DIR: &str = ".config_secret";

/// Docker layer tree inside the public configuration directory
pub const DOCKER_DIR: &str = "docker";

/// Rendered per-link Dockerfiles
pub const DOCKERFILES_DIR: &str = ".dockerfiles";

/// Canonical build file written by production runs
pub const CANONICAL_DOCKERFILE: &str = "Dockerfile";

/// Prefix of every rendered per-link Dockerfile
pub const DOCKERFILE_PREFIX: &str = "Dockerfile";

/// Extension of docker layer fragments and of the chain template
pub const FRAGMENT_EXTENSION: &str = "docker";

/// Chain template file name
pub const TEMPLATE_FILE: &str = "template.docker";

pub const SETTINGS_PUBLIC_FILE: &str = "settings_public.json";
pub const SETTINGS_COMMON_FILE: &str = "settings_common.json";
pub const SETTINGS_DEBUG_FILE: &str = "settings_debug.json";
pub const SETTINGS_DEPLOY_FILE: &str = "settings_deploy.json";

/// Django project directory inside a project
pub const DJANGO_DIR: &str = "django_app";

/// Name `django-admin startproject` is called with before the rename
pub const DJANGO_CONFIG_PACKAGE: &str = "config";

/// Directories created at the project root by `startproject`
pub const PROJECT_SUBDIRS: [&str; 5] =
    [CONFIG_DIR, CONFIG_SECRET_DIR, ".requirements", ".media", ".static_root"];

/// Suffix appended to the project name to name its virtual environment
pub const ENV_SUFFIX: &str = "-env";
