//! Typed systemd unit descriptor, rendered in a single pass.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::{ProvisionSettings, ServiceIdentity};

pub const SERVICE_SECTION: &str = "[Service]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    #[default]
    Always,
    OnFailure,
    OnAbnormal,
    No,
}

impl RestartPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RestartPolicy::Always => "always",
            RestartPolicy::OnFailure => "on-failure",
            RestartPolicy::OnAbnormal => "on-abnormal",
            RestartPolicy::No => "no",
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnitDescriptor {
    pub description: String,
    pub exec_start: String,
    pub working_directory: PathBuf,
    pub run_as_user: String,
    pub run_as_group: String,
    pub restart_policy: RestartPolicy,
}

impl ServiceUnitDescriptor {
    /// Descriptor running the application entrypoint with the venv interpreter.
    pub fn for_install(settings: &ProvisionSettings, identity: &ServiceIdentity) -> Self {
        let entrypoint = settings.install_root.join(&settings.service.entrypoint);
        let working_directory = entrypoint
            .parent()
            .unwrap_or(settings.install_root.as_path())
            .to_path_buf();
        let exec_start = format!(
            "{} {}",
            quote_arg(&settings.interpreter.venv_python()),
            quote_arg(&entrypoint)
        );

        Self {
            description: settings.service.description.clone(),
            exec_start,
            working_directory,
            run_as_user: identity.user.clone(),
            run_as_group: identity.group.clone(),
            restart_policy: settings.service.restart,
        }
    }

    /// Render the unit file.
    ///
    /// `ExecStart` directly follows `[Service]`, `WorkingDirectory` directly
    /// follows `ExecStart`, and `User`/`Group` directly follow `Restart`.
    pub fn render(&self) -> String {
        format!(
            "[Unit]
Description={description}
After=network-online.target sound.target
Wants=network-online.target

{service_section}
ExecStart={exec_start}
WorkingDirectory={working_directory}
Type=simple
Environment=PYTHONUNBUFFERED=1
Restart={restart}
User={user}
Group={group}
RestartSec=5

[Install]
WantedBy=multi-user.target
",
            description = self.description,
            service_section = SERVICE_SECTION,
            exec_start = self.exec_start,
            working_directory = self.working_directory.display(),
            restart = self.restart_policy,
            user = self.run_as_user,
            group = self.run_as_group,
        )
    }

    pub fn digest(&self) -> String {
        crate::fs::content_digest(self.render().as_bytes())
    }
}

/// Quote a path for an `ExecStart` line when it contains whitespace.
fn quote_arg(path: &Path) -> String {
    let raw = path.display().to_string();
    if raw.chars().any(char::is_whitespace) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}
