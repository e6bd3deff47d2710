//! Operator interaction, abstracted so the state machine can be driven
//! end-to-end in tests without a terminal attached.

use crate::error::{Error, Result};

/// Everything the controller needs from the operator: a multiple-choice
/// pick, a bounded percentage, and a yes/no confirmation.
pub trait OperatorPrompt {
    /// Presents `options` under `prompt` and returns the chosen index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prompt`] if the interaction itself fails.
    fn select(&self, prompt: &str, options: &[String]) -> Result<usize>;

    /// Prompts for a percentage in `[0, 100]`, re-prompting on a value
    /// outside that range or that doesn't parse as a number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prompt`] if the interaction itself fails.
    fn input_percent(&self, prompt: &str) -> Result<f64>;

    /// Prompts for a yes/no confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prompt`] if the interaction itself fails.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Real terminal-backed prompt implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompt;

impl OperatorPrompt for DialoguerPrompt {
    fn select(&self, prompt: &str, options: &[String]) -> Result<usize> {
        dialoguer::Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact()
            .map_err(|err| Error::Prompt(std::io::Error::other(err)))
    }

    fn input_percent(&self, prompt: &str) -> Result<f64> {
        loop {
            let raw: String = dialoguer::Input::new()
                .with_prompt(prompt)
                .interact_text()
                .map_err(|err| Error::Prompt(std::io::Error::other(err)))?;
            match raw.trim().parse::<f64>() {
                Ok(value) if (0.0..=100.0).contains(&value) => return Ok(value),
                _ => println!("enter a number between 0 and 100"),
            }
        }
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|err| Error::Prompt(std::io::Error::other(err)))
    }
}

/// Scripted prompt implementation for driving the state machine in tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    selects: std::cell::RefCell<std::collections::VecDeque<usize>>,
    percents: std::cell::RefCell<std::collections::VecDeque<f64>>,
    confirms: std::cell::RefCell<std::collections::VecDeque<bool>>,
}

impl ScriptedPrompt {
    /// Creates a scripted prompt with no queued answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next answer a `select` call will return.
    #[must_use]
    pub fn with_select(self, index: usize) -> Self {
        self.selects.borrow_mut().push_back(index);
        self
    }

    /// Queues the next answer an `input_percent` call will return.
    #[must_use]
    pub fn with_percent(self, percent: f64) -> Self {
        self.percents.borrow_mut().push_back(percent);
        self
    }

    /// Queues the next answer a `confirm` call will return.
    #[must_use]
    pub fn with_confirm(self, confirm: bool) -> Self {
        self.confirms.borrow_mut().push_back(confirm);
        self
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn select(&self, _prompt: &str, _options: &[String]) -> Result<usize> {
        self.selects
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::NoCandidates("scripted select exhausted".to_string()))
    }

    fn input_percent(&self, _prompt: &str) -> Result<f64> {
        self.percents
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::NoCandidates("scripted percent exhausted".to_string()))
    }

    fn confirm(&self, _prompt: &str) -> Result<bool> {
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::NoCandidates("scripted confirm exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_prompt_replays_queued_answers_in_order() {
        let prompt = ScriptedPrompt::new()
            .with_select(2)
            .with_percent(42.0)
            .with_confirm(true);
        assert_eq!(prompt.select("pick", &[]).unwrap(), 2);
        assert!((prompt.input_percent("rate").unwrap() - 42.0).abs() < f64::EPSILON);
        assert!(prompt.confirm("go?").unwrap());
    }

    #[test]
    fn exhausted_script_is_an_error() {
        let prompt = ScriptedPrompt::new();
        assert!(prompt.select("pick", &[]).is_err());
    }
}
