//! User input handling for interactive config entries.

use crate::error::Result;
use dialoguer::Input;

/// Source of values the config file asks for.
pub trait Prompter {
    /// Asks for a single line of text.
    ///
    /// # Arguments
    /// * `prompt` - Prompt text taken from the config file
    fn input(&self, prompt: &str) -> Result<String>;
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
    fn input(&self, prompt: &str) -> Result<String> {
        // dialoguer appends its own ": "
        let prompt = prompt.trim_end().trim_end_matches(':');
        let value: String = Input::new().with_prompt(prompt).allow_empty(true).interact_text()?;
        Ok(value)
    }
}
