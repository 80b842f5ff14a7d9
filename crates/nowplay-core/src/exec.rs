//! External command execution.
//!
//! Every interaction with the package manager, git and the process supervisor
//! goes through [`CommandRunner`], so workflows can be exercised against a
//! recording runner in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::debug;

use crate::error::CommandFailure;

/// Environment variables that redirect git away from the working copy.
const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// Description of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Run through `sudo` unless already root.
    pub privileged: bool,
    /// Capture stdout/stderr instead of streaming to the terminal.
    pub capture: bool,
    pub env_remove: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            privileged: false,
            capture: false,
            env_remove: Vec::new(),
        }
    }

    /// A `git` invocation with inherited repository overrides stripped.
    pub fn git() -> Self {
        let mut spec = Self::new("git");
        spec.env_remove = GIT_ENV_OVERRIDES.iter().map(|k| k.to_string()).collect();
        spec
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    /// First positional argument, e.g. `start` for `systemctl start x`.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.privileged {
            f.write_str("sudo ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of running a command. Non-zero exits are not errors at this level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

pub trait CommandRunner: fmt::Debug {
    /// Execute `cmd` and report how it exited.
    ///
    /// Returns `Err` only when the command could not be spawned at all.
    fn run(&self, cmd: &CommandSpec) -> anyhow::Result<CommandOutput>;

    /// Execute `cmd`, turning a non-zero exit into a [`CommandFailure`].
    fn run_checked(&self, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        let output = self.run(cmd)?;
        if !output.success {
            return Err(CommandFailure {
                command: cmd.to_string(),
                code: output.code,
                stderr: output.stderr,
            }
            .into());
        }
        Ok(output)
    }
}

/// Runs commands on the host, escalating privileged ones through `sudo`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    escalate: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            escalate: !nix::unistd::Uid::effective().is_root(),
        }
    }

    fn build(&self, cmd: &CommandSpec) -> Command {
        let mut command = if cmd.privileged && self.escalate {
            let mut sudo = Command::new("sudo");
            sudo.arg(&cmd.program);
            sudo
        } else {
            Command::new(&cmd.program)
        };
        command.args(&cmd.args);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }
        for key in &cmd.env_remove {
            command.env_remove(key);
        }
        command
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> anyhow::Result<CommandOutput> {
        debug!(command = %cmd, "running");
        let mut command = self.build(cmd);

        if cmd.capture {
            let output = command
                .stdin(Stdio::null())
                .output()
                .with_context(|| format!("Failed to run {}", cmd))?;
            return Ok(CommandOutput {
                success: output.status.success(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run {}", cmd))?;
        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_sudo_for_privileged() {
        let spec = CommandSpec::new("systemctl")
            .args(["start", "now-playing.service"])
            .privileged();
        assert_eq!(spec.to_string(), "sudo systemctl start now-playing.service");
        assert_eq!(spec.subcommand(), Some("start"));
    }

    #[test]
    fn git_spec_strips_repository_overrides() {
        let spec = CommandSpec::git().arg("status");
        assert_eq!(spec.program, "git");
        assert!(spec.env_remove.iter().any(|k| k == "GIT_DIR"));
        assert!(spec.env_remove.iter().any(|k| k == "GIT_WORK_TREE"));
    }

    #[test]
    fn system_runner_reports_exit_status() {
        let runner = SystemRunner { escalate: false };
        let ok = runner
            .run(&CommandSpec::new("sh").args(["-c", "exit 0"]).captured())
            .unwrap();
        assert!(ok.success);

        let failed = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]).captured())
            .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.code, Some(3));
        assert_eq!(failed.stderr.trim(), "boom");
    }

    #[test]
    fn run_checked_surfaces_command_failure() {
        let runner = SystemRunner { escalate: false };
        let err = runner
            .run_checked(&CommandSpec::new("sh").args(["-c", "exit 7"]).captured())
            .unwrap_err();
        let failure = err.downcast_ref::<CommandFailure>().unwrap();
        assert_eq!(failure.code, Some(7));
        assert_eq!(failure.command, "sh -c exit 7");
    }
}
