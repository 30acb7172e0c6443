//! Chain planning, rendering and image builds.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use serde_json::json;

use crate::command::run_status;
use crate::config::DockerSettings;
use crate::constants::TEMPLATE_FILE;
use crate::docker::select::{EndPoint, StartPoint};
use crate::docker::tree::{Layer, LayerTree};
use crate::error::{Error, Result};
use crate::layout::ProjectLayout;
use crate::renderer::TemplateRenderer;

/// One rendered and built image step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Position in the full selection sequence
    pub index: usize,
    /// Image tag produced by this link
    pub identity: String,
    /// Image this link is built FROM
    pub from_image: String,
    /// Fragment file rendered into the template
    pub fragment: PathBuf,
    /// Name of the rendered file inside `.dockerfiles`
    pub file_name: String,
    /// Also written as the project's canonical Dockerfile
    pub canonical: bool,
}

/// The links between a start and an end point, in sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPlan {
    pub links: Vec<ChainLink>,
    pub production: bool,
}

impl ChainPlan {
    /// Plans the links `start..=end` of `sequence`.
    ///
    /// The first layer of the sequence is built from the root image; every
    /// other layer from the identity of its predecessor, even when that
    /// predecessor lies before `start` and is expected to exist already.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the range is empty or outside the sequence,
    ///   or if a production run has no `dockerHubImageName`
    pub fn new(
        sequence: &[Layer<'_>],
        start: StartPoint,
        end: EndPoint,
        docker: &DockerSettings,
    ) -> Result<Self> {
        let start = start.index();
        if start > end.index || end.index >= sequence.len() {
            return Err(Error::ConfigError(format!(
                "invalid chain range {}..={} for {} layer(s)",
                start,
                end.index,
                sequence.len()
            )));
        }
        if end.production && docker.published_image.is_none() {
            return Err(missing_published_image());
        }
        let last = sequence.len() - 1;

        let links = (start..=end.index)
            .map(|index| {
                let layer = &sequence[index];
                ChainLink {
                    index,
                    identity: layer.identity(),
                    from_image: match index {
                        0 => docker.root_image.clone(),
                        _ => sequence[index - 1].identity(),
                    },
                    fragment: layer.sub_option.path.clone(),
                    file_name: layer.dockerfile_name(),
                    canonical: end.production && index == last,
                }
            })
            .collect();

        Ok(Self { links, production: end.production })
    }
}

/// Result of one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Success,
    /// The build command exited unsuccessfully; `None` when killed by a signal
    Failed { code: Option<i32> },
    /// Rendered only, no build requested
    Rendered,
    /// Not attempted because an earlier link failed
    Skipped,
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::Success => write!(f, "ok"),
            LinkOutcome::Failed { code: Some(code) } => write!(f, "failed (exit code {})", code),
            LinkOutcome::Failed { code: None } => write!(f, "failed (terminated by signal)"),
            LinkOutcome::Rendered => write!(f, "rendered"),
            LinkOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub identity: String,
    pub dockerfile: PathBuf,
    pub outcome: LinkOutcome,
}

/// Outcome of a whole chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub links: Vec<LinkReport>,
    /// Canonical Dockerfile written by a production run
    pub canonical: Option<PathBuf>,
}

impl BuildReport {
    pub fn failures(&self) -> impl Iterator<Item = &LinkReport> {
        self.links.iter().filter(|link| matches!(link.outcome, LinkOutcome::Failed { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Turns a report with failed links into `Error::BuildFailedError`.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failures().count();
        if failed > 0 {
            return Err(Error::BuildFailedError { failed, total: self.links.len() });
        }
        Ok(self)
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Build report ==")?;
        for link in &self.links {
            writeln!(f, "  {}: {}", link.identity, link.outcome)?;
        }
        if let Some(canonical) = &self.canonical {
            writeln!(f, "  canonical Dockerfile: {}", canonical.display())?;
        }
        Ok(())
    }
}

/// What happens to the remaining links after one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure; later links are reported as skipped
    #[default]
    Abort,
    /// Attempt every link and report all failures at the end
    Continue,
}

/// Builds one image from a rendered Dockerfile.
pub trait ImageBuilder {
    fn build(&self, dockerfile: &Path, tag: &str) -> Result<LinkOutcome>;
}

/// `docker build <context> -t <tag> -f <dockerfile>`.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
    context: PathBuf,
}

impl DockerCli {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(program: S, context: P) -> Self {
        Self { program: program.into(), context: context.into() }
    }

    pub fn command(&self, dockerfile: &Path, tag: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("build").arg(&self.context).args(["-t", tag, "-f"]).arg(dockerfile);
        command
    }
}

impl ImageBuilder for DockerCli {
    fn build(&self, dockerfile: &Path, tag: &str) -> Result<LinkOutcome> {
        let status = run_status(&mut self.command(dockerfile, tag))?;
        if status.success() {
            Ok(LinkOutcome::Success)
        } else {
            Ok(LinkOutcome::Failed { code: status.code() })
        }
    }
}

/// Reads the chain template: `.config/docker/template.docker`, or the first
/// one found inside a category directory.
///
/// # Errors
/// * `Error::TemplateError` if neither exists
pub fn load_template(layout: &ProjectLayout, tree: &LayerTree) -> Result<String> {
    let root_template = layout.docker_dir.join(TEMPLATE_FILE);
    let path = if root_template.is_file() {
        root_template
    } else if let Some(path) = tree.category_template() {
        path.to_path_buf()
    } else {
        return Err(Error::TemplateError(format!(
            "'{}' not found in '{}'",
            TEMPLATE_FILE,
            layout.docker_dir.display()
        )));
    };
    debug!("Using chain template {}", path.display());
    Ok(fs::read_to_string(path)?)
}

/// Placeholders every chain template must use.
const TEMPLATE_PLACEHOLDERS: [&str; 2] = ["from_image", "content"];

/// Fails unless `template` reads every placeholder a link fills in.
///
/// # Errors
/// * `Error::TemplateError` naming the placeholders the template never uses
pub fn check_template(renderer: &dyn TemplateRenderer, template: &str) -> Result<()> {
    let used = renderer.placeholders(template)?;
    let missing: Vec<&str> =
        TEMPLATE_PLACEHOLDERS.into_iter().filter(|name| !used.contains(*name)).collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(Error::TemplateError(format!(
        "the chain template never uses {} (write them as {{{{ name }}}})",
        missing.join(", ")
    )))
}

fn missing_published_image() -> Error {
    Error::ConfigError(
        "docker.dockerHubImageName is required for a production build \
         (run the 'settings' command to fill it in)"
            .to_string(),
    )
}

/// Renders, writes and builds the links of a [`ChainPlan`].
pub struct ChainBuilder<'a> {
    layout: &'a ProjectLayout,
    docker: &'a DockerSettings,
    renderer: &'a dyn TemplateRenderer,
    template: String,
    builder: Option<&'a dyn ImageBuilder>,
    policy: FailurePolicy,
}

impl<'a> ChainBuilder<'a> {
    /// Creates a builder that only renders; see [`ChainBuilder::with_builder`].
    pub fn new(
        layout: &'a ProjectLayout,
        docker: &'a DockerSettings,
        renderer: &'a dyn TemplateRenderer,
        template: String,
    ) -> Self {
        Self { layout, docker, renderer, template, builder: None, policy: FailurePolicy::Abort }
    }

    pub fn with_builder(mut self, builder: Option<&'a dyn ImageBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Renders the template for `link` built FROM `from_image`.
    pub fn render_link(&self, link: &ChainLink, from_image: &str) -> Result<String> {
        let content = fs::read_to_string(&link.fragment)?;
        let context = json!({
            "from_image": from_image,
            "maintainer": self.docker.maintainer,
            "content": content,
        });
        self.renderer.render(&self.template, &context)
    }

    /// Runs every link of `plan` in order.
    ///
    /// Rendering and I/O errors abort the run. Build failures are recorded in
    /// the report; under [`FailurePolicy::Abort`] the links after the first
    /// failure are skipped.
    pub fn run(&self, plan: &ChainPlan) -> Result<BuildReport> {
        fs::create_dir_all(&self.layout.dockerfiles_dir)?;
        println!("== Make Dockerfiles ==");

        let mut report = BuildReport::default();
        let mut aborted = false;
        for link in &plan.links {
            let dockerfile = self.layout.dockerfiles_dir.join(&link.file_name);
            if aborted {
                report.links.push(LinkReport {
                    identity: link.identity.clone(),
                    dockerfile,
                    outcome: LinkOutcome::Skipped,
                });
                continue;
            }

            println!("{}", link.file_name);
            fs::write(&dockerfile, self.render_link(link, &link.from_image)?)?;

            if link.canonical {
                let canonical = self.layout.canonical_dockerfile();
                let published_image =
                    self.docker.published_image.as_deref().ok_or_else(missing_published_image)?;
                fs::write(&canonical, self.render_link(link, published_image)?)?;
                println!("{}", canonical.display());
                report.canonical = Some(canonical);
            }

            let outcome = match self.builder {
                Some(builder) => builder.build(&dockerfile, &link.identity)?,
                None => LinkOutcome::Rendered,
            };
            if let LinkOutcome::Failed { .. } = outcome {
                warn!("Building '{}' failed: {}", link.identity, outcome);
                aborted = self.policy == FailurePolicy::Abort;
            }
            report.links.push(LinkReport { identity: link.identity.clone(), dockerfile, outcome });
        }
        Ok(report)
    }
}
