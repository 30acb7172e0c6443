mod common;

use std::fs;
use std::path::Path;

use common::project;
use django_setting::config::{
    ensure_settings_files, install_default_config, read_json, write_json, Settings, Tier,
};
use django_setting::error::Error;
use django_setting::layout::ProjectLayout;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_missing_settings_files_are_created_empty() {
    let workdir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(workdir.path(), "demo");

    ensure_settings_files(&layout).unwrap();

    assert!(layout.docker_dir.is_dir());
    for tier in Tier::ALL {
        assert_eq!(fs::read_to_string(tier.path(&layout)).unwrap(), "{}");
    }
    assert_eq!(Settings::load(&layout).unwrap(), Settings::default());
}

#[test]
fn test_existing_settings_files_are_kept() {
    let (_workdir, layout) = project("demo");
    let before = fs::read_to_string(layout.public_settings_file()).unwrap();

    ensure_settings_files(&layout).unwrap();

    assert_eq!(fs::read_to_string(layout.public_settings_file()).unwrap(), before);
    assert_eq!(fs::read_to_string(layout.secret_debug_file()).unwrap(), "{}");
}

#[test]
fn test_docker_settings() {
    let (_workdir, layout) = project("demo");
    let docker = Settings::load(&layout).unwrap().docker().unwrap();

    assert_eq!(docker.base_name, "app");
    assert_eq!(docker.root_image, "python:3.11");
    assert_eq!(docker.published_image.as_deref(), Some("hub/app"));
    assert_eq!(docker.maintainer, "dev@example.com");
}

#[test]
fn test_missing_docker_settings_are_reported_together() {
    let settings = Settings {
        public: json!({ "docker": { "rootImageName": "" } }),
        ..Settings::default()
    };

    match settings.docker() {
        Err(Error::ConfigError(message)) => {
            assert!(message.contains("DockerfileBaseName"));
            assert!(message.contains("rootImageName"));
            assert!(!message.contains("dockerHubImageName"));
            assert!(message.contains("settings_common.json"));
            assert!(message.contains("run the 'settings' command"));
        }
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_published_image_is_optional() {
    let settings = Settings {
        public: json!({
            "docker": { "DockerfileBaseName": "app", "rootImageName": "python:3.11" }
        }),
        common: json!({ "docker": { "maintainer": "" } }),
        ..Settings::default()
    };
    let docker = settings.docker().unwrap();
    assert_eq!(docker.published_image, None);

    let blank = Settings {
        public: json!({
            "docker": {
                "DockerfileBaseName": "app",
                "rootImageName": "python:3.11",
                "dockerHubImageName": "",
            }
        }),
        ..settings
    };
    match blank.docker() {
        Err(Error::ConfigError(message)) => assert!(message.contains("dockerHubImageName")),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_settings_round_trip_sorted() {
    let (_workdir, layout) = project("demo");
    let mut settings = Settings::load(&layout).unwrap();
    settings.tier_mut(Tier::Debug)["django"] = json!({ "b": 1, "a": 2 });
    settings.save(&layout).unwrap();

    let written = fs::read_to_string(layout.secret_debug_file()).unwrap();
    assert_eq!(written, "{\n    \"django\": {\n        \"a\": 2,\n        \"b\": 1\n    }\n}\n");
    assert_eq!(Settings::load(&layout).unwrap(), settings);
}

#[test]
fn test_read_json_rejects_non_objects() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "[1, 2]").unwrap();
    assert!(matches!(read_json(&path), Err(Error::ConfigError(_))));

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(read_json(&path), Err(Error::ConfigError(_))));

    write_json(&path, &json!({ "ok": true })).unwrap();
    assert_eq!(read_json(&path).unwrap(), json!({ "ok": true }));
}

#[test]
fn test_install_default_config() {
    let workdir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(workdir.path(), "demo");

    let written = install_default_config(&layout, false).unwrap();

    assert_eq!(written.len(), 7);
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/config");
    assert!(!dir_diff::is_different(&layout.config_dir, bundled).unwrap());
}

#[test]
fn test_install_default_config_keeps_edits_unless_overwriting() {
    let workdir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(workdir.path(), "demo");
    install_default_config(&layout, false).unwrap();
    fs::write(layout.public_settings_file(), "{\"edited\": true}").unwrap();

    assert!(install_default_config(&layout, false).unwrap().is_empty());
    assert_eq!(read_json(layout.public_settings_file()).unwrap(), json!({ "edited": true }));

    assert_eq!(install_default_config(&layout, true).unwrap().len(), 7);
    assert!(read_json(layout.public_settings_file()).unwrap().get("edited").is_none());
}

#[test]
fn test_default_tree_is_discoverable() {
    let workdir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(workdir.path(), "demo");
    install_default_config(&layout, false).unwrap();

    let tree = django_setting::docker::discover(&layout.docker_dir, "app").unwrap();
    let labels: Vec<String> = tree.categories().iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["01.base", "02.common", "03.extra"]);
    assert_eq!(tree.options().count(), 4);
}
