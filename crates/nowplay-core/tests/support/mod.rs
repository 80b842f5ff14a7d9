//! Shared fixtures: a recording command runner, a scripted prompter and
//! settings rooted in a temp directory.
#![allow(dead_code)]

pub mod git;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;

use nowplay_core::config::{ChoiceOption, Prompter};
use nowplay_core::exec::{CommandOutput, CommandRunner, CommandSpec};
use nowplay_core::git::RemoteSpec;
use nowplay_core::settings::ProvisionSettings;

/// Stubs apt-get, systemctl, venv creation and pip; runs git, install and rm
/// for real (never through sudo).
#[derive(Debug, Default)]
pub struct FakeRunner {
    log: Mutex<Vec<CommandSpec>>,
    unit_active: Mutex<bool>,
    fail_on: Mutex<Option<String>>,
    violations: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose rendered form contains `needle`.
    pub fn fail_on(&self, needle: &str) {
        *self.fail_on.lock().unwrap() = Some(needle.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    pub fn set_unit_active(&self, active: bool) {
        *self.unit_active.lock().unwrap() = active;
    }

    pub fn unit_active(&self) -> bool {
        *self.unit_active.lock().unwrap()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.log.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.specs().iter().map(ToString::to_string).collect()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Index of the first recorded command starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.commands().iter().position(|c| c.starts_with(prefix))
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn violations(&self) -> Vec<String> {
        self.violations.lock().unwrap().clone()
    }

    fn systemctl(&self, cmd: &CommandSpec) -> CommandOutput {
        let mut active = self.unit_active.lock().unwrap();
        match cmd.subcommand() {
            Some("start") => *active = true,
            Some("stop") => *active = false,
            Some("is-active") if !*active => return CommandOutput::failed(3, ""),
            // Registration is decided by the descriptor file in tests.
            Some("list-unit-files") => return CommandOutput::failed(1, ""),
            _ => {}
        }
        CommandOutput::ok()
    }

    fn create_venv(&self, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        let venv = cmd
            .args
            .last()
            .ok_or_else(|| anyhow::anyhow!("venv path missing"))?;
        std::fs::create_dir_all(Path::new(venv).join("bin"))?;
        Ok(CommandOutput::ok())
    }

    fn execute(&self, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }
        for key in &cmd.env_remove {
            command.env_remove(key);
        }
        let output = command.output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        self.log.lock().unwrap().push(cmd.clone());

        if let Some(needle) = self.fail_on.lock().unwrap().as_deref()
            && cmd.to_string().contains(needle)
        {
            return Ok(CommandOutput::failed(1, "injected failure"));
        }

        match cmd.program.as_str() {
            "apt-get" => Ok(CommandOutput::ok()),
            "systemctl" => Ok(self.systemctl(cmd)),
            "python3" if cmd.args.iter().any(|a| a == "venv") => self.create_venv(cmd),
            program if program.ends_with("/pip") => Ok(CommandOutput::ok()),
            "git" => {
                if cmd.subcommand() == Some("fetch") && self.unit_active() {
                    self.violations
                        .lock()
                        .unwrap()
                        .push(format!("{cmd} ran while the unit was active"));
                }
                self.execute(cmd)
            }
            "install" | "rm" => self.execute(cmd),
            other => anyhow::bail!("unexpected command: {other}"),
        }
    }
}

/// Answers handed out in prompt order; confirmations are queued separately.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    confirms: RefCell<VecDeque<bool>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_confirms(self, confirms: &[bool]) -> Self {
        self.confirms.borrow_mut().extend(confirms.iter().copied());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer for {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn secret(&self, prompt: &str) -> anyhow::Result<String> {
        self.next(prompt)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> anyhow::Result<String> {
        let answer = self.next(prompt)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn choice(
        &self,
        prompt: &str,
        _options: &[ChoiceOption<'_>],
        default: &str,
    ) -> anyhow::Result<String> {
        let answer = self.next(prompt)?;
        if answer.is_empty() {
            return Ok(default.to_string());
        }
        Ok(answer)
    }

    fn confirm(&self, prompt: &str, _default: bool) -> anyhow::Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted confirmation for {prompt:?}"))
    }
}

/// A full set of install answers with the given display and orientation input.
pub fn install_answers(display: &str, orientation: &str) -> Vec<String> {
    [
        "owm-key",
        "spotify-id",
        "spotify-secret",
        "",
        "openai-key",
        "47.6062,-122.3321",
        display,
        orientation,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Settings with every path under `base` and the service identity fixed.
pub fn test_settings(base: &Path, remote_url: &str) -> ProvisionSettings {
    let mut settings = ProvisionSettings::for_root(base.join("home/now-playing"));
    settings.repository = RemoteSpec::new(remote_url);
    settings.interpreter.venv_dir = base.join("home/.virtualenvs/pimoroni");
    settings.service.unit_dir = base.join("systemd");
    settings.service.user = Some("pi".to_string());
    settings.service.group = Some("pi".to_string());
    settings
}
