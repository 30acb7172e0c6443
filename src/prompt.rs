//! Operator interaction.
//! Numbered menus are parsed by pure functions returning [`InputError`];
//! [`choose`] is the only loop that talks to the operator.

use crate::error::Result;
use dialoguer::{Confirm, Input};
use thiserror::Error;

/// Operator I/O used by every interactive step.
pub trait Prompter {
    /// Shows a block of text to the operator.
    fn show(&self, text: &str);

    /// Reads one line of text. Empty input is allowed.
    fn input(&self, prompt: &str) -> Result<String>;

    /// Asks a yes/no question. `skip` answers yes without asking.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn show(&self, text: &str) {
        println!("{}", text);
    }

    fn input(&self, prompt: &str) -> Result<String> {
        let value = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }
}

/// Recoverable menu input problems. The menu is shown again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Input value error ('{0}' is not a number)")]
    NotANumber(String),

    #[error("Selected index is not valid ({value} is not between {min} and {max})")]
    OutOfRange { value: usize, min: usize, max: usize },

    #[error("A selection is required")]
    Empty,
}

/// Parses `raw` as a number within `min..=max`.
pub fn parse_number(raw: &str, min: usize, max: usize) -> std::result::Result<usize, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InputError::Empty);
    }
    let value: usize = raw
        .parse()
        .map_err(|_| InputError::NotANumber(raw.to_string()))?;
    if value < min || value > max {
        return Err(InputError::OutOfRange { value, min, max });
    }
    Ok(value)
}

/// A numbered menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    title: String,
    entries: Vec<(usize, String)>,
    prompt: String,
}

impl Menu {
    pub fn new<T: Into<String>, P: Into<String>>(title: T, prompt: P) -> Self {
        Self { title: title.into(), entries: Vec::new(), prompt: prompt.into() }
    }

    pub fn entry<L: Into<String>>(mut self, number: usize, label: L) -> Self {
        self.entries.push((number, label.into()));
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The numbers offered, in display order.
    pub fn numbers(&self) -> Vec<usize> {
        self.entries.iter().map(|(number, _)| *number).collect()
    }

    pub fn render(&self) -> String {
        let mut text = self.title.clone();
        for (number, label) in &self.entries {
            text.push_str(&format!("\n  {}.{}", number, label));
        }
        text
    }
}

/// Shows `menu` until `parse` accepts the operator's answer.
pub fn choose<T, F>(prompter: &dyn Prompter, menu: &Menu, parse: F) -> Result<T>
where
    F: Fn(&str) -> std::result::Result<T, InputError>,
{
    loop {
        prompter.show(&menu.render());
        let raw = prompter.input(menu.prompt())?;
        match parse(&raw) {
            Ok(choice) => {
                prompter.show("");
                return Ok(choice);
            }
            Err(e) => {
                log::debug!("Rejected menu input '{}': {}", raw, e);
                prompter.show(&format!("  ! {}\n", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_render() {
        let menu = Menu::new("Select start image:", "> ")
            .entry(0, "python:3.11-slim")
            .entry(1, "app-base-00-alpine");

        assert_eq!(
            menu.render(),
            "Select start image:\n  0.python:3.11-slim\n  1.app-base-00-alpine"
        );
        assert_eq!(menu.numbers(), vec![0, 1]);
    }
}
