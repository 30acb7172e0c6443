#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use django_setting::config::write_json;
use django_setting::docker::{ImageBuilder, LinkOutcome};
use django_setting::error::{Error, Result};
use django_setting::layout::ProjectLayout;
use django_setting::prompt::Prompter;
use serde_json::json;
use tempfile::TempDir;

/// Answers prompts from a script and records everything shown.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    pub shown: RefCell<Vec<String>>,
    pub asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    pub fn transcript(&self) -> String {
        self.shown.borrow().join("\n")
    }

    /// Number of times `text` was shown.
    pub fn shown_count(&self, text: &str) -> usize {
        self.shown.borrow().iter().filter(|shown| shown.as_str() == text).count()
    }

    fn next(&self, prompt: &str) -> Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::ConfigError(format!("no scripted answer for '{}'", prompt)))
    }
}

impl Prompter for ScriptedPrompter {
    fn show(&self, text: &str) {
        self.shown.borrow_mut().push(text.to_string());
    }

    fn input(&self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Ok(self.next(&prompt)?.trim().eq_ignore_ascii_case("y"))
    }
}

/// Records every build and fails the tags it was told to fail.
#[derive(Default)]
pub struct RecordingBuilder {
    pub built: RefCell<Vec<(PathBuf, String)>>,
    failing: HashSet<String>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(tags: &[&str]) -> Self {
        Self { failing: tags.iter().map(|tag| tag.to_string()).collect(), ..Default::default() }
    }

    pub fn tags(&self) -> Vec<String> {
        self.built.borrow().iter().map(|(_, tag)| tag.clone()).collect()
    }
}

impl ImageBuilder for RecordingBuilder {
    fn build(&self, dockerfile: &Path, tag: &str) -> Result<LinkOutcome> {
        self.built.borrow_mut().push((dockerfile.to_path_buf(), tag.to_string()));
        if self.failing.contains(tag) {
            Ok(LinkOutcome::Failed { code: Some(1) })
        } else {
            Ok(LinkOutcome::Success)
        }
    }
}

pub fn write_file<P: AsRef<Path>>(root: P, relative: &str, content: &str) {
    let path = root.as_ref().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub const TEMPLATE: &str = "FROM {{ from_image }}\nMAINTAINER {{ maintainer }}\n{{ content }}";

/// A project with complete docker settings and no layers yet.
pub fn project(name: &str) -> (TempDir, ProjectLayout) {
    let workdir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(workdir.path(), name);
    fs::create_dir_all(&layout.docker_dir).unwrap();
    fs::create_dir_all(&layout.secret_dir).unwrap();
    write_json(
        layout.public_settings_file(),
        &json!({
            "docker": {
                "DockerfileBaseName": "app",
                "rootImageName": "python:3.11",
                "dockerHubImageName": "hub/app",
            }
        }),
    )
    .unwrap();
    let common = json!({ "docker": { "maintainer": "dev@example.com" } });
    write_json(layout.secret_common_file(), &common).unwrap();
    (workdir, layout)
}

/// `00.template` holding the template, `01.base` with one layer and
/// `02.extra` with two alternatives sharing order `00`.
pub fn worked_example(layout: &ProjectLayout) {
    let docker = &layout.docker_dir;
    write_file(docker, "00.template/template.docker", TEMPLATE);
    write_file(docker, "01.base/00.alpine.docker", "RUN apk add bash\n");
    write_file(docker, "02.extra/00.debug.docker", "ENV DEBUG=1\n");
    write_file(docker, "02.extra/00.production.docker", "ENV DEBUG=0\n");
}

/// Three single-choice layers: `01.os/00.slim`, `02.deps/00.pip`, `03.app/00.run`.
pub fn linear_chain(layout: &ProjectLayout) {
    let docker = &layout.docker_dir;
    write_file(docker, "template.docker", TEMPLATE);
    write_file(docker, "01.os/00.slim.docker", "RUN true\n");
    write_file(docker, "02.deps/00.pip.docker", "RUN pip install -r requirements.txt\n");
    write_file(docker, "03.app/00.run.docker", "CMD [\"run\"]\n");
}
