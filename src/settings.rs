//! The `settings` command.
//! Asks the operator for every missing settings value and writes all tiers back.

use std::process::Command;

use serde_json::{json, Map, Value};

use crate::command::run_checked;
use crate::config::{install_default_config, Settings, Tier};
use crate::constants::CONFIG_SECRET_DIR;
use crate::error::{Error, Result};
use crate::git;
use crate::layout::ProjectLayout;
use crate::prompt::{choose, parse_number, InputError, Menu, Prompter};

const SECRETS_ARCHIVE: &str = "secrets.tar";
const DB_ENGINE_PREFIX: &str = "django.db.backends.";

/// Which secret tiers are collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Debug,
    Deploy,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsOptions {
    /// Skip the mode menu
    pub mode: Option<Mode>,
    /// Replace the `.config` tree with the embedded defaults
    pub reset_config: bool,
    /// Archive and encrypt the secret tiers afterwards
    pub encrypt: bool,
}

/// A settings value asked from the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub tier: Tier,
    /// Object keys leading to the value; the last one names it
    pub path: Vec<&'static str>,
    pub message: String,
    /// Prepended to answers and string defaults
    pub prefix: &'static str,
    /// Stored when the operator leaves the answer empty
    pub default: Option<Value>,
}

impl Field {
    pub fn new<M: Into<String>>(tier: Tier, path: &[&'static str], message: M) -> Self {
        Self { tier, path: path.to_vec(), message: message.into(), prefix: "", default: None }
    }

    pub fn with_default<V: Into<Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }
}

/// True for absent values, nulls, blank strings and empty containers.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            ensure_object(other)
        }
    }
}

/// Walks `path` from `root`, creating objects where needed.
pub(crate) fn object_at<'a>(root: &'a mut Value, path: &[&str]) -> &'a mut Map<String, Value> {
    path.iter().fold(ensure_object(root), |map, segment| {
        ensure_object(map.entry(segment.to_string()).or_insert_with(|| json!({})))
    })
}

fn with_prefix(prefix: &str, value: &Value) -> Value {
    match value {
        Value::String(s) if !prefix.is_empty() => Value::String(format!("{}{}", prefix, s)),
        _ => value.clone(),
    }
}

/// Asks for `field` until it has a value. Present values are kept as they are.
pub fn fill_field(root: &mut Value, field: &Field, prompter: &dyn Prompter) -> Result<Value> {
    let (key, parents) = field
        .path
        .split_last()
        .ok_or_else(|| Error::ConfigError(format!("empty settings path for '{}'", field.message)))?;
    let object = object_at(root, parents);

    if let Some(present) = object.get(*key).filter(|value| !is_missing(Some(value))) {
        return Ok(present.clone());
    }
    loop {
        let answer = prompter.input(&field.message)?;
        let answer = answer.trim();
        let value = if !answer.is_empty() {
            Value::String(format!("{}{}", field.prefix, answer))
        } else if let Some(default) = &field.default {
            with_prefix(field.prefix, default)
        } else {
            continue;
        };
        object.insert(key.to_string(), value.clone());
        return Ok(value);
    }
}

fn fill(settings: &mut Settings, field: &Field, prompter: &dyn Prompter) -> Result<Value> {
    fill_field(settings.tier_mut(field.tier), field, prompter)
}

pub fn public_fields() -> Vec<Field> {
    vec![
        Field::new(Tier::Public, &["docker", "DockerfileBaseName"], "Dockerfile base name"),
        Field::new(Tier::Public, &["docker", "rootImageName"], "Docker root image name (FROM)"),
        Field::new(
            Tier::Public,
            &["docker", "dockerHubImageName"],
            "Docker published base image name (FROM of the project Dockerfile)",
        ),
        Field::new(Tier::Public, &["common", "appName"], "Application name"),
        Field::new(Tier::Public, &["common", "defaultDBName"], "Default DB name"),
    ]
}

pub fn common_fields() -> Vec<Field> {
    vec![
        Field::new(Tier::Common, &["docker", "maintainer"], "DockerImage Maintainer Email"),
        Field::new(Tier::Common, &["github", "username"], "GitHub username"),
        Field::new(Tier::Common, &["github", "password"], "GitHub password"),
        Field::new(
            Tier::Common,
            &["django", "default_superuser", "username"],
            "Django default superuser username",
        ),
        Field::new(
            Tier::Common,
            &["django", "default_superuser", "password"],
            "Django default superuser password",
        ),
        Field::new(
            Tier::Common,
            &["django", "default_superuser", "email"],
            "Django default superuser email (default: none)",
        )
        .with_default(""),
    ]
}

pub fn aws_fields() -> Vec<Field> {
    vec![
        Field::new(Tier::Deploy, &["aws", "access_key_id"], "[Deploy] AWS AccessKeyId"),
        Field::new(Tier::Deploy, &["aws", "secret_access_key"], "[Deploy] AWS SecretAccessKey"),
        Field::new(Tier::Deploy, &["aws", "s3_bucket_name"], "[Deploy] AWS S3 Bucket name"),
        Field::new(Tier::Deploy, &["aws", "s3_region_name"], "[Deploy] AWS S3 Region name"),
    ]
}

/// Asks for the default database of `tier`.
/// The debug tier offers local defaults; sqlite databases only need a file name.
fn collect_database(
    settings: &mut Settings,
    tier: Tier,
    layout: &ProjectLayout,
    prompter: &dyn Prompter,
) -> Result<()> {
    const PATH: [&str; 4] = ["django", "databases", "default", ""];
    let field = |key: &'static str, message: String| {
        let mut path = PATH.to_vec();
        path[3] = key;
        Field { tier, path, message, prefix: "", default: None }
    };
    let (label, local) = match tier {
        Tier::Deploy => ("[Deploy]", false),
        _ => ("[Debug]", true),
    };

    let engine = fill(
        settings,
        &field("ENGINE", format!("{} DB Engine (default: postgresql_psycopg2)", label))
            .with_prefix(DB_ENGINE_PREFIX)
            .with_default("postgresql_psycopg2"),
        prompter,
    )?;

    if engine.as_str().is_some_and(|engine| engine.contains("sqlite3")) {
        let db_file = layout.django_dir.join("db.sqlite3").display().to_string();
        let name = field("NAME", format!("{} DB Name (default: {})", label, db_file));
        fill(settings, &name.with_default(db_file), prompter)?;
        return Ok(());
    }

    let mut fields = Vec::new();
    if local {
        let db_name = settings.public["common"]["defaultDBName"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let name = field("NAME", format!("{} DB Name (default: {})", label, db_name));
        fields.push(if db_name.is_empty() { name } else { name.with_default(db_name) });
        fields.push(
            field("HOST", format!("{} DB Host (default: localhost)", label))
                .with_default("localhost"),
        );
    } else {
        fields.push(field("NAME", format!("{} DB Name", label)));
        fields.push(field("HOST", format!("{} DB Host", label)));
    }
    fields.push(field("PORT", format!("{} DB Port (default: 5432)", label)).with_default("5432"));
    fields.push(field("USER", format!("{} DB User", label)));
    fields.push(field("PASSWORD", format!("{} DB Password", label)));

    for field in &fields {
        fill(settings, field, prompter)?;
    }
    Ok(())
}

/// Asks for every missing value of the tiers used by `mode`.
pub fn collect(
    settings: &mut Settings,
    mode: Mode,
    layout: &ProjectLayout,
    prompter: &dyn Prompter,
) -> Result<()> {
    for field in public_fields().iter().chain(common_fields().iter()) {
        fill(settings, field, prompter)?;
    }

    let allowed_hosts = Field::new(
        Tier::Debug,
        &["django", "allowed_hosts"],
        "[Debug] Django allowed hosts (default: [\"*\"])",
    )
    .with_default(json!(["*"]));
    fill(settings, &allowed_hosts, prompter)?;
    collect_database(settings, Tier::Debug, layout, prompter)?;

    if mode == Mode::Deploy {
        collect_database(settings, Tier::Deploy, layout, prompter)?;
        for field in &aws_fields() {
            fill(settings, field, prompter)?;
        }
    }
    Ok(())
}

/// Parses the mode menu answer; empty input selects debug.
pub fn parse_mode_choice(raw: &str) -> std::result::Result<Mode, InputError> {
    if raw.trim().is_empty() {
        return Ok(Mode::Debug);
    }
    match parse_number(raw, 1, 2)? {
        1 => Ok(Mode::Debug),
        _ => Ok(Mode::Deploy),
    }
}

pub fn select_mode(prompter: &dyn Prompter) -> Result<Mode> {
    let menu = Menu::new(" Select setting mode (default: 1.Debug)", "   > Select")
        .entry(1, "Debug")
        .entry(2, "Deploy");
    choose(prompter, &menu, parse_mode_choice)
}

/// Archives the secret directory, encrypts it for Travis CI and stages the result.
pub fn encrypt_secrets(layout: &ProjectLayout) -> Result<()> {
    run_checked(
        Command::new("tar")
            .current_dir(&layout.project_dir)
            .args(["cvf", SECRETS_ARCHIVE, CONFIG_SECRET_DIR]),
    )?;
    run_checked(
        Command::new("travis")
            .current_dir(&layout.project_dir)
            .args(["encrypt-file", SECRETS_ARCHIVE, "--add"]),
    )?;
    git::stage(&layout.project_dir, &["secrets.tar.enc", ".travis.yml"])?;
    println!(" encrypt secret config");
    Ok(())
}

/// Runs the `settings` command.
pub fn run(
    layout: &ProjectLayout,
    options: &SettingsOptions,
    prompter: &dyn Prompter,
) -> Result<()> {
    layout.require_project()?;
    prompter.show("=== SettingsBuild ===");

    for path in install_default_config(layout, options.reset_config)? {
        log::debug!("Installed {}", path.display());
    }
    let mut settings = Settings::load(layout)?;
    let mode = match options.mode {
        Some(mode) => mode,
        None => select_mode(prompter)?,
    };
    collect(&mut settings, mode, layout, prompter)?;
    settings.save(layout)?;

    if options.encrypt {
        encrypt_secrets(layout)?;
    }
    Ok(())
}
