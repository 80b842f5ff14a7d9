//! Terminal prompts for the install and update workflows.
//!
//! Uses dialoguer for input and console for styling.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use nowplay_core::config::{ChoiceOption, Prompter};

pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for DialoguerPrompter {
    fn secret(&self, prompt: &str) -> Result<String> {
        let value = Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()?;
        Ok(value)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(prompt);
        if let Some(default) = default {
            input = input
                .allow_empty(true)
                .default(default.to_string())
                .show_default(!default.is_empty());
        }
        Ok(input.interact_text()?)
    }

    /// Printed menu plus free-text answer, so unknown answers reach the
    /// caller's fallback instead of being rejected here.
    fn choice(&self, prompt: &str, options: &[ChoiceOption<'_>], default: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write_menu(&mut stdout, prompt, options)?;
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{prompt} [{}]", selectors(options)))
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

fn write_menu<W: Write>(writer: &mut W, prompt: &str, options: &[ChoiceOption<'_>]) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "  {}", style(prompt).bold())?;
    for option in options {
        writeln!(
            writer,
            "    {}) {}",
            style(option.selector).cyan(),
            option.label
        )?;
    }
    Ok(())
}

fn selectors(options: &[ChoiceOption<'_>]) -> String {
    options
        .iter()
        .map(|o| o.selector)
        .collect::<Vec<_>>()
        .join("/")
}
