//! Layered docker image builds.
//!
//! A run discovers the layer tree, lets the operator resolve every option
//! and pick a start and end image, then renders and builds each link of the
//! resulting chain in order.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::layout::ProjectLayout;
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;

pub mod chain;
pub mod select;
pub mod tree;

pub use chain::{
    BuildReport, ChainBuilder, ChainLink, ChainPlan, DockerCli, FailurePolicy, ImageBuilder,
    LinkOutcome, LinkReport,
};
pub use select::{EndPoint, StartPoint};
pub use tree::{discover, Category, CategoryOption, Layer, LayerTree, Order, SubOption};

/// Runs one interactive docker build.
///
/// `builder` set to `None` renders every Dockerfile without building images.
pub fn run(
    layout: &ProjectLayout,
    settings: &Settings,
    prompter: &dyn Prompter,
    renderer: &dyn TemplateRenderer,
    builder: Option<&dyn ImageBuilder>,
    policy: FailurePolicy,
) -> Result<BuildReport> {
    layout.require_project()?;
    let docker = settings.docker()?;

    let mut tree = discover(&layout.docker_dir, docker.base_name.as_str())?;
    if tree.is_empty() {
        return Err(Error::EmptyChainError { docker_dir: layout.docker_dir.display().to_string() });
    }
    let template = chain::load_template(layout, &tree)?;
    chain::check_template(renderer, &template)?;

    prompter.show("=== DockerBuild ===");
    select::select_options(&mut tree, prompter)?;

    let sequence = tree.resolved_sequence()?;
    let start = select::select_start(prompter, &sequence, &docker.root_image)?;
    let end = select::select_end(prompter, &sequence, start)?;
    let plan = ChainPlan::new(&sequence, start, end, &docker)?;

    ChainBuilder::new(layout, &docker, renderer, template)
        .with_builder(builder)
        .with_policy(policy)
        .run(&plan)
}
