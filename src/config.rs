//! Project settings.
//! Settings live in four JSON tiers: one public file and three secret files.
//! They are loaded once per run; commands receive the values they need as
//! immutable structs extracted from [`Settings`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::layout::ProjectLayout;

/// Default `.config` tree installed into new projects, relative to `.config`.
pub const DEFAULT_CONFIG_FILES: [(&str, &str); 7] = [
    ("settings_public.json", include_str!("../assets/config/settings_public.json")),
    ("docker/template.docker", include_str!("../assets/config/docker/template.docker")),
    (
        "docker/01.base/00.base.docker",
        include_str!("../assets/config/docker/01.base/00.base.docker"),
    ),
    (
        "docker/02.common/00.requirements.docker",
        include_str!("../assets/config/docker/02.common/00.requirements.docker"),
    ),
    (
        "docker/03.extra/00.debug.docker",
        include_str!("../assets/config/docker/03.extra/00.debug.docker"),
    ),
    (
        "docker/03.extra/00.production.docker",
        include_str!("../assets/config/docker/03.extra/00.production.docker"),
    ),
    (
        "docker/03.extra/01.runserver.docker",
        include_str!("../assets/config/docker/03.extra/01.runserver.docker"),
    ),
];

/// One settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Public,
    Common,
    Debug,
    Deploy,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Public, Tier::Common, Tier::Debug, Tier::Deploy];

    pub fn path(self, layout: &ProjectLayout) -> PathBuf {
        match self {
            Tier::Public => layout.public_settings_file(),
            Tier::Common => layout.secret_common_file(),
            Tier::Debug => layout.secret_debug_file(),
            Tier::Deploy => layout.secret_deploy_file(),
        }
    }
}

/// All settings tiers of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub public: Value,
    pub common: Value,
    pub debug: Value,
    pub deploy: Value,
}

impl Default for Settings {
    fn default() -> Self {
        Self { public: json!({}), common: json!({}), debug: json!({}), deploy: json!({}) }
    }
}

/// Docker values needed by a chain build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerSettings {
    /// Prefix of every layer identity (`DockerfileBaseName`)
    pub base_name: String,
    /// FROM image of the first link (`rootImageName`)
    pub root_image: String,
    /// FROM image of the canonical Dockerfile (`dockerHubImageName`),
    /// only needed by production runs
    pub published_image: Option<String>,
    /// Secret maintainer string (`docker.maintainer`)
    pub maintainer: String,
}

#[derive(Deserialize)]
struct PublicDocker {
    #[serde(rename = "DockerfileBaseName")]
    base_name: String,
    #[serde(rename = "rootImageName")]
    root_image: String,
    #[serde(rename = "dockerHubImageName", default)]
    published_image: Option<String>,
}

#[derive(Deserialize)]
struct SecretDocker {
    maintainer: String,
}

#[derive(Deserialize)]
struct DockerSection<T> {
    docker: T,
}

fn public_docker_schema() -> Value {
    json!({
        "type": "object",
        "required": ["docker"],
        "properties": {
            "docker": {
                "type": "object",
                "required": ["DockerfileBaseName", "rootImageName"],
                "properties": {
                    "DockerfileBaseName": { "type": "string", "minLength": 1 },
                    "rootImageName": { "type": "string", "minLength": 1 },
                    "dockerHubImageName": { "type": "string", "minLength": 1 }
                }
            }
        }
    })
}

fn secret_docker_schema() -> Value {
    json!({
        "type": "object",
        "required": ["docker"],
        "properties": {
            "docker": {
                "type": "object",
                "required": ["maintainer"],
                "properties": {
                    "maintainer": { "type": "string" }
                }
            }
        }
    })
}

/// Validates `instance` against `schema`, collecting every violation.
fn validate(schema: &Value, instance: &Value, file: &str) -> Vec<String> {
    match jsonschema::validator_for(schema) {
        Ok(validator) => validator
            .iter_errors(instance)
            .map(|e| format!("{}: {}", file, e))
            .collect(),
        Err(e) => vec![format!("invalid schema: {}", e)],
    }
}

impl Settings {
    /// Ensures every settings file exists, then reads all tiers.
    pub fn load(layout: &ProjectLayout) -> Result<Self> {
        ensure_settings_files(layout)?;
        Ok(Self {
            public: read_json(Tier::Public.path(layout))?,
            common: read_json(Tier::Common.path(layout))?,
            debug: read_json(Tier::Debug.path(layout))?,
            deploy: read_json(Tier::Deploy.path(layout))?,
        })
    }

    pub fn tier(&self, tier: Tier) -> &Value {
        match tier {
            Tier::Public => &self.public,
            Tier::Common => &self.common,
            Tier::Debug => &self.debug,
            Tier::Deploy => &self.deploy,
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut Value {
        match tier {
            Tier::Public => &mut self.public,
            Tier::Common => &mut self.common,
            Tier::Debug => &mut self.debug,
            Tier::Deploy => &mut self.deploy,
        }
    }

    /// Writes every tier back to its file.
    pub fn save(&self, layout: &ProjectLayout) -> Result<()> {
        for tier in Tier::ALL {
            write_json(tier.path(layout), self.tier(tier))?;
        }
        Ok(())
    }

    /// Extracts the docker values, reporting every missing key at once.
    ///
    /// # Errors
    /// * `Error::ConfigError` listing each schema violation of the public
    ///   and secret common tiers
    pub fn docker(&self) -> Result<DockerSettings> {
        let mut problems = validate(&public_docker_schema(), &self.public, "settings_public.json");
        problems.extend(validate(&secret_docker_schema(), &self.common, "settings_common.json"));
        if !problems.is_empty() {
            return Err(Error::ConfigError(format!(
                "{} (run the 'settings' command to fill them in)",
                problems.join("; ")
            )));
        }

        let public: DockerSection<PublicDocker> = serde_json::from_value(self.public.clone())?;
        let secret: DockerSection<SecretDocker> = serde_json::from_value(self.common.clone())?;

        Ok(DockerSettings {
            base_name: public.docker.base_name,
            root_image: public.docker.root_image,
            published_image: public.docker.published_image,
            maintainer: secret.docker.maintainer,
        })
    }
}

/// Creates the configuration directories and every missing settings file as `{}`.
/// Existing files are left untouched.
pub fn ensure_settings_files(layout: &ProjectLayout) -> Result<()> {
    fs::create_dir_all(&layout.docker_dir)?;
    fs::create_dir_all(&layout.secret_dir)?;
    for tier in Tier::ALL {
        let path = tier.path(layout);
        if !path.exists() {
            debug!("Creating empty settings file {}", path.display());
            fs::write(&path, "{}")?;
        }
    }
    Ok(())
}

/// Installs the embedded default `.config` tree.
/// Existing files are kept unless `overwrite` is set. Returns the files written.
pub fn install_default_config(layout: &ProjectLayout, overwrite: bool) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (relative, content) in DEFAULT_CONFIG_FILES {
        let target = layout.config_dir.join(relative);
        if target.exists() && !overwrite {
            debug!("Keeping existing {}", target.display());
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        written.push(target);
    }
    Ok(written)
}

/// Reads a settings file; its top level must be a JSON object.
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        Error::ConfigError(format!("invalid JSON in '{}': {}", path.display(), e))
    })?;
    if !value.is_object() {
        return Err(Error::ConfigError(format!(
            "'{}' must contain a JSON object",
            path.display()
        )));
    }
    Ok(value)
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sorted(v))).collect();
            Value::Object(ordered.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        _ => value.clone(),
    }
}

/// Writes `value` with sorted keys and four-space indentation.
pub fn write_json<P: AsRef<Path>>(path: P, value: &Value) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(&sorted(value), &mut serializer)?;
    buffer.push(b'\n');
    fs::write(path, buffer)?;
    Ok(())
}
