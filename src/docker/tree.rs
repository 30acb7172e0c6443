//! Docker layer tree.
//!
//! The docker configuration directory holds one directory per category,
//! named `<order>.<title>`. Each category holds fragment files named
//! `<order>.<title>.docker`. Fragments sharing an order are alternative
//! sub-options of one option; exactly one of them is selected per run.
//!
//! ```text
//! .config/docker/
//! ├── template.docker
//! ├── 01.base/00.alpine.docker
//! └── 02.extra/
//!     ├── 00.debug.docker
//!     └── 00.production.docker
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use crate::constants::{DOCKERFILE_PREFIX, FRAGMENT_EXTENSION, TEMPLATE_FILE};
use crate::error::{Error, Result};

/// Numeric order parsed from a name prefix.
/// Keeps the digits as written so `00` stays `00` in identities and file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    value: u64,
    label: String,
}

impl Order {
    /// Parses a run of ASCII digits. Returns `None` for anything else.
    pub fn parse(label: &str) -> Option<Self> {
        if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = label.parse().ok()?;
        Some(Self { value, label: label.to_string() })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Ord for Order {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value).then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One fragment file: a concrete choice for an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubOption {
    pub order: Order,
    pub title: String,
    pub path: PathBuf,
}

/// A position inside a category that resolves to exactly one sub-option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    /// `<order>.<title>` of the owning category
    pub category: String,
    pub order: Order,
    pub sub_options: Vec<SubOption>,
    selected: Option<usize>,
}

impl CategoryOption {
    fn new(category: String, order: Order) -> Self {
        Self { category, order, sub_options: Vec::new(), selected: None }
    }

    /// True when the operator has to pick among several sub-options.
    pub fn requires_selection(&self) -> bool {
        self.sub_options.len() > 1
    }

    /// The only sub-option of this option.
    ///
    /// # Errors
    /// * `Error::SelectionRequiredError` if there are several sub-options
    pub fn unique_sub_option(&self) -> Result<&SubOption> {
        match self.sub_options.as_slice() {
            [only] => Ok(only),
            _ => Err(Error::SelectionRequiredError {
                category: self.category.clone(),
                option: self.order.to_string(),
                count: self.sub_options.len(),
            }),
        }
    }

    pub fn selected_sub_option(&self) -> Option<&SubOption> {
        self.selected.and_then(|index| self.sub_options.get(index))
    }

    /// Marks the sub-option at `index` as selected.
    /// Out-of-range indexes leave the selection untouched and return `None`.
    pub fn select(&mut self, index: usize) -> Option<&SubOption> {
        if index >= self.sub_options.len() {
            return None;
        }
        self.selected = Some(index);
        self.sub_options.get(index)
    }
}

/// A directory of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub order: Order,
    pub title: String,
    pub path: PathBuf,
    pub options: Vec<CategoryOption>,
}

impl Category {
    /// `<order>.<title>`, as the directory is named.
    pub fn label(&self) -> String {
        format!("{}.{}", self.order, self.title)
    }
}

/// One selected sub-option together with its position in the tree.
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub category: &'a Category,
    pub option: &'a CategoryOption,
    pub sub_option: &'a SubOption,
    base_image_name: &'a str,
}

impl Layer<'_> {
    /// Image tag of this layer: `{base}-{category title}-{option order}-{title}`.
    pub fn identity(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.base_image_name, self.category.title, self.option.order, self.sub_option.title
        )
    }

    /// Name of the rendered Dockerfile of this layer.
    pub fn dockerfile_name(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            DOCKERFILE_PREFIX,
            self.category.order,
            self.category.title,
            self.option.order,
            self.sub_option.title
        )
    }
}

/// Categories, options and sub-options of one docker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTree {
    base_image_name: String,
    categories: Vec<Category>,
    category_template: Option<PathBuf>,
}

impl LayerTree {
    pub fn base_image_name(&self) -> &str {
        &self.base_image_name
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Every option, in category-then-option order.
    pub fn options(&self) -> impl Iterator<Item = &CategoryOption> {
        self.categories.iter().flat_map(|category| category.options.iter())
    }

    pub fn options_mut(&mut self) -> impl Iterator<Item = &mut CategoryOption> {
        self.categories.iter_mut().flat_map(|category| category.options.iter_mut())
    }

    /// True when no category holds an option.
    pub fn is_empty(&self) -> bool {
        self.options().next().is_none()
    }

    /// `template.docker` found inside a category directory, if any.
    pub fn category_template(&self) -> Option<&Path> {
        self.category_template.as_deref()
    }

    /// The selected sub-option of every option; `None` where nothing is selected yet.
    pub fn selected_sequence(&self) -> Vec<Option<Layer<'_>>> {
        self.categories
            .iter()
            .flat_map(|category| {
                category.options.iter().map(move |option| {
                    option.selected_sub_option().map(|sub_option| Layer {
                        category,
                        option,
                        sub_option,
                        base_image_name: &self.base_image_name,
                    })
                })
            })
            .collect()
    }

    /// True when every option has a selected sub-option.
    pub fn is_fully_selected(&self) -> bool {
        self.options().all(|option| option.selected_sub_option().is_some())
    }

    /// The selection sequence with every entry present.
    ///
    /// # Errors
    /// * `Error::IncompleteSelectionError` naming the first unselected option
    pub fn resolved_sequence(&self) -> Result<Vec<Layer<'_>>> {
        if let Some(option) = self.options().find(|option| option.selected_sub_option().is_none())
        {
            return Err(Error::IncompleteSelectionError {
                category: option.category.clone(),
                option: option.order.to_string(),
            });
        }
        Ok(self.selected_sequence().into_iter().flatten().collect())
    }
}

fn malformed(name: &str, parent: &Path, expected: &str) -> Error {
    Error::MalformedNameError {
        name: name.to_string(),
        parent: parent.display().to_string(),
        expected: expected.to_string(),
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::ConfigError(e.to_string()))
}

/// Splits `name` into order and title with `pattern`.
fn parse_name(pattern: &Regex, name: &str) -> Option<(Order, String)> {
    let captures = pattern.captures(name)?;
    let order = Order::parse(captures.get(1)?.as_str())?;
    Some((order, captures.get(2)?.as_str().to_string()))
}

/// Lists the immediate children of `dir`, hidden entries excluded.
fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| malformed(&entry.file_name().to_string_lossy(), dir, "UTF-8 name"))?
            .to_string();
        if name.starts_with('.') {
            debug!("Skipping hidden entry {}", entry.path().display());
            continue;
        }
        entries.push((name, entry.path().to_path_buf(), entry.file_type().is_dir()));
    }
    Ok(entries)
}

/// Builds the layer tree from the docker configuration directory.
///
/// Categories are sorted by order then title; fragments likewise, so options
/// appear in ascending order and sub-options of one option by title.
///
/// # Errors
/// * `Error::MalformedNameError` if a category directory or fragment file
///   does not follow the naming convention
/// * `Error::IoError` if a directory cannot be listed
pub fn discover<P: AsRef<Path>, S: Into<String>>(
    docker_dir: P,
    base_image_name: S,
) -> Result<LayerTree> {
    let docker_dir = docker_dir.as_ref();
    let category_pattern = compile(r"^(\d+)\.(.+)$")?;
    let fragment_pattern =
        compile(&format!(r"^(\d+)\.(.+)\.{}$", regex::escape(FRAGMENT_EXTENSION)))?;

    let mut found = Vec::new();
    for (name, path, is_dir) in list_dir(docker_dir)? {
        if !is_dir {
            continue;
        }
        let (order, title) = parse_name(&category_pattern, &name)
            .ok_or_else(|| malformed(&name, docker_dir, "<order>.<title>"))?;
        found.push((order, title, path));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut categories = Vec::new();
    let mut category_template = None;
    for (order, title, path) in found {
        let label = format!("{}.{}", order, title);
        let mut fragments = Vec::new();
        for (name, file, is_dir) in list_dir(&path)? {
            if is_dir {
                debug!("Skipping nested directory {}", file.display());
                continue;
            }
            if name == TEMPLATE_FILE {
                category_template.get_or_insert(file);
                continue;
            }
            let (file_order, file_title) = parse_name(&fragment_pattern, &name).ok_or_else(|| {
                malformed(&name, &path, &format!("<order>.<title>.{}", FRAGMENT_EXTENSION))
            })?;
            fragments.push((file_order, file_title, file));
        }
        fragments.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let mut options: IndexMap<u64, CategoryOption> = IndexMap::new();
        for (file_order, file_title, file) in fragments {
            options
                .entry(file_order.value())
                .or_insert_with(|| CategoryOption::new(label.clone(), file_order.clone()))
                .sub_options
                .push(SubOption { order: file_order, title: file_title, path: file });
        }

        debug!("Discovered category {} with {} option(s)", label, options.len());
        categories.push(Category { order, title, path, options: options.into_values().collect() });
    }

    Ok(LayerTree { base_image_name: base_image_name.into(), categories, category_template })
}
