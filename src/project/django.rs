//! Rewriting of the `settings.py` generated by `django-admin startproject`
//! into a settings package whose secrets live in `.config_secret`.

use regex::{NoExpand, Regex};

use crate::error::{Error, Result};

pub const SETTINGS_INIT: &str = include_str!("../../assets/codes/settings/__init__.py");
pub const SETTINGS_DEBUG: &str = include_str!("../../assets/codes/settings/debug.py");
pub const SETTINGS_DEPLOY: &str = include_str!("../../assets/codes/settings/deploy.py");
pub const MEMBER_MODELS: &str = include_str!("../../assets/codes/member/models.py");
const SETTINGS_PATHS: &str = include_str!("../../assets/codes/settings/base.py");
const SETTINGS_INSTALLED_APPS: &str =
    include_str!("../../assets/codes/settings/installed_apps.py");

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::TemplateError(e.to_string()))
}

/// Removes the `SECRET_KEY` assignment and returns `(secret_key, settings)`.
///
/// # Errors
/// * `Error::TemplateError` if the settings contain no `SECRET_KEY`
pub fn extract_secret_key(settings: &str) -> Result<(String, String)> {
    let pattern = compile(r"SECRET_KEY = '(?P<secret_key>.*?)'.*?\n")?;
    let secret_key = pattern
        .captures(settings)
        .and_then(|captures| captures.name("secret_key"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::TemplateError("SECRET_KEY not found in settings.py".to_string()))?;

    let settings = pattern.replace(settings, "").into_owned();
    Ok((secret_key, settings))
}

/// Adds the imports the path block needs in front of the first import.
fn add_imports(settings: &str) -> Result<String> {
    let mut imports = String::from("import json\n");
    if !settings.contains("from pathlib import Path") {
        imports.push_str("from pathlib import Path\n");
    }
    let first_import = compile(r"(?m)^(import |from )")?;
    let at = first_import.find(settings).map(|m| m.start()).unwrap_or(0);

    let mut result = String::with_capacity(settings.len() + imports.len());
    result.push_str(&settings[..at]);
    result.push_str(&imports);
    result.push_str(&settings[at..]);
    Ok(result)
}

/// Produces `settings/base.py` from a `settings.py` without its secret key.
pub fn rewrite_settings(settings: &str, project_name: &str) -> Result<String> {
    let settings = add_imports(settings)?;
    let settings = settings.replace(
        "Django settings for config project.",
        &format!("Django settings for {} project.", project_name),
    );

    let replacements = [
        (compile(r"\n(BASE_DIR.*?\n)")?, SETTINGS_PATHS, false),
        (compile(r"(?s)(# SECURITY WARNING: keep the secret.*?\n)")?, "", false),
        (
            compile(concat!(
                r"(?s)(?P<before>\nTEMPLATES = .*?\n)",
                r"(?P<indent>\s+)(?P<key>'DIRS': )(?P<value>\[\]),"
            ))?,
            "${before}${indent}${key}[\n${indent}    TEMPLATE_DIR,\n${indent}],",
            true,
        ),
        (compile(r"(?s)(\nINSTALLED_APPS = .*?)(\n])")?, SETTINGS_INSTALLED_APPS.trim_end(), false),
    ];

    let mut settings = settings;
    for (pattern, replacement, expand) in replacements {
        settings = if expand {
            pattern.replace_all(&settings, replacement).into_owned()
        } else {
            pattern.replace_all(&settings, NoExpand(replacement)).into_owned()
        };
    }
    Ok(settings)
}
