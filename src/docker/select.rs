//! Interactive selection of the layers to build.
//!
//! Each menu has a pure parser (`parse_*_choice`) that maps raw operator
//! input to a choice or an [`InputError`]; the `select_*` functions only
//! drive [`choose`] with it.

use crate::docker::tree::{CategoryOption, Layer, LayerTree, SubOption};
use crate::error::{Error, Result};
use crate::prompt::{choose, parse_number, InputError, Menu, Prompter};

/// First link of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPoint {
    /// Build from the root base image
    Root,
    /// Build from the layer at this sequence index
    Layer(usize),
}

impl StartPoint {
    /// Sequence index of the first link.
    pub fn index(self) -> usize {
        match self {
            StartPoint::Root => 0,
            StartPoint::Layer(index) => index,
        }
    }
}

/// Last link of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndPoint {
    /// Sequence index of the last link
    pub index: usize,
    /// The last layer of the whole sequence was chosen
    pub production: bool,
}

/// Parses a 1-based sub-option number into an index.
pub fn parse_sub_option_choice(raw: &str, count: usize) -> std::result::Result<usize, InputError> {
    parse_number(raw, 1, count).map(|number| number - 1)
}

/// Parses the start menu answer. Empty input and `0` select the root image.
pub fn parse_start_choice(raw: &str, len: usize) -> std::result::Result<StartPoint, InputError> {
    if raw.trim().is_empty() {
        return Ok(StartPoint::Root);
    }
    match parse_number(raw, 0, len)? {
        0 => Ok(StartPoint::Root),
        number => Ok(StartPoint::Layer(number - 1)),
    }
}

/// Parses the end menu answer. Only layers at or after `start` are accepted;
/// empty input selects the last layer.
pub fn parse_end_choice(
    raw: &str,
    start: usize,
    len: usize,
) -> std::result::Result<EndPoint, InputError> {
    let last = len.checked_sub(1).ok_or(InputError::Empty)?;
    let index = if raw.trim().is_empty() {
        last
    } else {
        parse_number(raw, start + 1, len)? - 1
    };
    Ok(EndPoint { index, production: index == last })
}

pub fn sub_option_menu(option: &CategoryOption) -> Menu {
    let title = format!(
        "Category({})\n - Option({})\n -- SubOption select:",
        option.category, option.order
    );
    option
        .sub_options
        .iter()
        .enumerate()
        .fold(Menu::new(title, "  > Select SubOption"), |menu, (index, sub_option)| {
            menu.entry(index + 1, sub_option.title.as_str())
        })
}

pub fn start_menu(sequence: &[Layer<'_>], root_image: &str) -> Menu {
    let prompt = format!("  > Select image number (default: 0.{})", root_image);
    sequence.iter().enumerate().fold(
        Menu::new("Select start image:", prompt).entry(0, root_image),
        |menu, (index, layer)| menu.entry(index + 1, layer.identity()),
    )
}

/// End menu; layers before `start` are not offered.
pub fn end_menu(sequence: &[Layer<'_>], start: StartPoint) -> Menu {
    let prompt = match sequence.last() {
        Some(last) => {
            format!("  > Select image number (default: {}.{})", sequence.len(), last.identity())
        }
        None => "  > Select image number".to_string(),
    };
    sequence
        .iter()
        .enumerate()
        .skip(start.index())
        .fold(Menu::new("Select end image:", prompt), |menu, (index, layer)| {
            menu.entry(index + 1, layer.identity())
        })
}

/// Resolves one option. An option with a single sub-option is selected
/// without prompting.
pub fn select_sub_option<'a>(
    option: &'a mut CategoryOption,
    prompter: &dyn Prompter,
) -> Result<&'a SubOption> {
    let index = if option.requires_selection() {
        let count = option.sub_options.len();
        choose(prompter, &sub_option_menu(option), |raw| parse_sub_option_choice(raw, count))?
    } else {
        option.unique_sub_option()?;
        0
    };

    let category = option.category.clone();
    let order = option.order.to_string();
    option.select(index).ok_or(Error::IncompleteSelectionError { category, option: order })
}

/// Resolves every option of every category, in traversal order.
pub fn select_options(tree: &mut LayerTree, prompter: &dyn Prompter) -> Result<()> {
    for option in tree.options_mut() {
        let sub_option = select_sub_option(option, prompter)?;
        log::debug!("Selected '{}' ({})", sub_option.title, sub_option.path.display());
    }
    Ok(())
}

pub fn select_start(
    prompter: &dyn Prompter,
    sequence: &[Layer<'_>],
    root_image: &str,
) -> Result<StartPoint> {
    let len = sequence.len();
    choose(prompter, &start_menu(sequence, root_image), |raw| parse_start_choice(raw, len))
}

pub fn select_end(
    prompter: &dyn Prompter,
    sequence: &[Layer<'_>],
    start: StartPoint,
) -> Result<EndPoint> {
    if sequence.is_empty() {
        return Err(Error::ConfigError("there is no image to end the chain with".to_string()));
    }
    let len = sequence.len();
    choose(prompter, &end_menu(sequence, start), |raw| {
        parse_end_choice(raw, start.index(), len)
    })
}
