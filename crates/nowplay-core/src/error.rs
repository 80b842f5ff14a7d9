//! Error taxonomy for provisioning workflows.
//!
//! Components return `anyhow::Result` internally; the orchestrator tags each
//! failure with the [`Stage`] it happened in so the CLI can report it and map
//! it to a stable exit code.

use std::fmt;

use thiserror::Error;

use crate::privilege::PrivilegeError;

/// Named workflow stages. Each maps to a distinct process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PrivilegeCheck,
    Settings,
    Dependencies,
    TargetCleanup,
    Repository,
    Layout,
    Configuration,
    ServiceTeardown,
    ServiceInstall,
    ServiceActivate,
    ServiceStop,
    InterpreterRefresh,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PrivilegeCheck => "privilege check",
            Stage::Settings => "settings",
            Stage::Dependencies => "dependency installation",
            Stage::TargetCleanup => "target cleanup",
            Stage::Repository => "repository sync",
            Stage::Layout => "directory layout",
            Stage::Configuration => "configuration",
            Stage::ServiceTeardown => "service teardown",
            Stage::ServiceInstall => "service install",
            Stage::ServiceActivate => "service activation",
            Stage::ServiceStop => "service stop",
            Stage::InterpreterRefresh => "interpreter refresh",
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Stage::PrivilegeCheck => 10,
            Stage::Settings => 11,
            Stage::Dependencies => 12,
            Stage::TargetCleanup => 13,
            Stage::Repository => 14,
            Stage::Layout => 15,
            Stage::Configuration => 16,
            Stage::ServiceTeardown => 17,
            Stage::ServiceInstall => 18,
            Stage::ServiceActivate => 19,
            Stage::ServiceStop => 20,
            Stage::InterpreterRefresh => 21,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external command (package manager, git, supervisor) exited unsuccessfully.
#[derive(Debug, Error)]
#[error("`{command}` exited with {}{}", describe_code(.code), describe_stderr(.stderr))]
pub struct CommandFailure {
    pub command: String,
    pub code: Option<i32>,
    pub stderr: String,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Top-level failure of an Install or Update run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Privilege(#[from] PrivilegeError),

    #[error("{stage} failed")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl ProvisionError {
    pub fn stage(&self) -> Stage {
        match self {
            ProvisionError::Privilege(_) => Stage::PrivilegeCheck,
            ProvisionError::Stage { stage, .. } => *stage,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.stage().exit_code()
    }
}

/// Tags an `anyhow` result with the stage it belongs to.
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T, ProvisionError>;
}

impl<T> StageContext<T> for anyhow::Result<T> {
    fn stage(self, stage: Stage) -> Result<T, ProvisionError> {
        self.map_err(|source| ProvisionError::Stage { stage, source })
    }
}
