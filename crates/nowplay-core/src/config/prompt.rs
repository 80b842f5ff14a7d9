//! Operator input seam.
//!
//! The CLI implements this with terminal prompts; tests script the answers.

/// One entry of an enumerated choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption<'a> {
    pub selector: &'a str,
    pub label: &'a str,
}

pub trait Prompter {
    /// Hidden input for API keys and client secrets.
    fn secret(&self, prompt: &str) -> anyhow::Result<String>;

    /// Free text; an empty answer yields `default` when given.
    fn text(&self, prompt: &str, default: Option<&str>) -> anyhow::Result<String>;

    /// Enumerated choice. Returns the raw answer; the caller maps unknown
    /// answers to a default.
    fn choice(
        &self,
        prompt: &str,
        options: &[ChoiceOption<'_>],
        default: &str,
    ) -> anyhow::Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> anyhow::Result<bool>;
}
