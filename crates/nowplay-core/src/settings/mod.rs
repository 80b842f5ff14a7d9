//! Provisioning settings.
//!
//! A single [`ProvisionSettings`] value is loaded once per run and passed by
//! reference to every component. All fields have defaults, so a missing or
//! partial `provision.toml` is valid.

pub mod layout;
pub mod store;

use std::path::{Path, PathBuf};

use anyhow::Context;
use nix::unistd::{Gid, Group, Uid, User};
use serde::{Deserialize, Serialize};

use crate::git::RemoteSpec;
use crate::service::RestartPolicy;

pub use layout::{InstallLayout, InstallationTarget};
pub use store::SettingsStore;

const DEFAULT_ROOT_DIR: &str = "now-playing";
const DEFAULT_VENV_DIR: &str = ".virtualenvs/pimoroni";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionSettings {
    /// Installation root; every other path is derived from it.
    pub install_root: PathBuf,
    /// OS packages installed through apt.
    pub system_packages: Vec<String>,
    pub repository: RemoteSpec,
    pub service: ServiceSettings,
    pub interpreter: InterpreterSettings,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            install_root: home_dir().join(DEFAULT_ROOT_DIR),
            system_packages: [
                "git",
                "python3-pip",
                "python3-venv",
                "python3-dev",
                "libportaudio2",
                "portaudio19-dev",
                "libopenblas-dev",
                "libopenjp2-7",
                "libjpeg-dev",
                "libgpiod-dev",
                "fonts-dejavu-core",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            repository: RemoteSpec::default(),
            service: ServiceSettings::default(),
            interpreter: InterpreterSettings::default(),
        }
    }
}

impl ProvisionSettings {
    /// Settings rooted at `install_root`, otherwise defaults.
    pub fn for_root(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install_root)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.install_root.is_absolute() {
            anyhow::bail!(
                "install_root must be an absolute path: {}",
                self.install_root.display()
            );
        }
        self.repository.validate()?;
        self.service.validate()?;
        if self.interpreter.venv_dir.starts_with(&self.install_root) {
            anyhow::bail!(
                "interpreter.venv_dir ({}) must live outside install_root, \
                 which is replaced on install",
                self.interpreter.venv_dir.display()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Unit name without the `.service` suffix.
    pub name: String,
    pub description: String,
    /// Defaults to the invoking user.
    pub user: Option<String>,
    /// Defaults to the invoking user's primary group.
    pub group: Option<String>,
    pub restart: RestartPolicy,
    pub unit_dir: PathBuf,
    /// Application entrypoint, relative to the install root.
    pub entrypoint: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "now-playing".to_string(),
            description: "Now Playing e-ink display".to_string(),
            user: None,
            group: None,
            restart: RestartPolicy::Always,
            unit_dir: PathBuf::from("/etc/systemd/system"),
            entrypoint: PathBuf::from("src/now_playing.py"),
        }
    }
}

impl ServiceSettings {
    pub fn unit_file_name(&self) -> String {
        format!("{}.service", self.name)
    }

    pub fn resolve_identity(&self) -> anyhow::Result<ServiceIdentity> {
        let user = match &self.user {
            Some(user) => user.clone(),
            None => current_user_name()?,
        };
        let group = match &self.group {
            Some(group) => group.clone(),
            None => current_group_name()?,
        };
        Ok(ServiceIdentity { user, group })
    }

    fn validate(&self) -> anyhow::Result<()> {
        let plain = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !plain || self.name.ends_with(".service") {
            anyhow::bail!(
                "service.name must be a bare unit name without suffix: {:?}",
                self.name
            );
        }
        if !self.unit_dir.is_absolute() {
            anyhow::bail!(
                "service.unit_dir must be an absolute path: {}",
                self.unit_dir.display()
            );
        }
        if self.entrypoint.is_absolute() {
            anyhow::bail!(
                "service.entrypoint must be relative to install_root: {}",
                self.entrypoint.display()
            );
        }
        Ok(())
    }
}

/// User and group the service runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub user: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    /// System interpreter used to create the venv.
    pub python: String,
    pub venv_dir: PathBuf,
    /// Dependency manifest installed into the venv.
    pub packages: Vec<String>,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            venv_dir: home_dir().join(DEFAULT_VENV_DIR),
            packages: [
                "numpy",
                "pillow",
                "requests",
                "pyyaml",
                "spotipy",
                "shazamio",
                "sounddevice",
                "openai",
                "inky[rpi]",
                "gpiod",
                "gpiodevice",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl InterpreterSettings {
    pub fn venv_python(&self) -> PathBuf {
        self.venv_dir.join("bin").join("python3")
    }

    pub fn venv_pip(&self) -> PathBuf {
        self.venv_dir.join("bin").join("pip")
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| Path::new("/home/pi").to_path_buf())
}

fn current_user_name() -> anyhow::Result<String> {
    let uid = Uid::current();
    let user = User::from_uid(uid)
        .with_context(|| format!("Failed to look up user for uid {uid}"))?
        .ok_or_else(|| anyhow::anyhow!("No passwd entry for uid {uid}"))?;
    Ok(user.name)
}

fn current_group_name() -> anyhow::Result<String> {
    let gid = Gid::current();
    let group = Group::from_gid(gid)
        .with_context(|| format!("Failed to look up group for gid {gid}"))?
        .ok_or_else(|| anyhow::anyhow!("No group entry for gid {gid}"))?;
    Ok(group.name)
}
