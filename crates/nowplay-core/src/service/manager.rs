//! Unit registration lifecycle: `Absent -> Installed -> Active`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use super::ServiceUnitDescriptor;
use crate::exec::{CommandRunner, CommandSpec};
use crate::settings::ServiceSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Absent,
    Installed,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownOutcome {
    Removed,
    /// Nothing was registered.
    AlreadyAbsent,
}

#[derive(Debug)]
pub struct ServiceUnitManager {
    unit_name: String,
    unit_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl ServiceUnitManager {
    /// `unit_name` includes the `.service` suffix.
    pub fn new(
        unit_name: impl Into<String>,
        unit_dir: PathBuf,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            unit_name: unit_name.into(),
            unit_dir,
            runner,
        }
    }

    pub fn from_settings(settings: &ServiceSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(settings.unit_file_name(), settings.unit_dir.clone(), runner)
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(&self.unit_name)
    }

    pub fn is_registered(&self) -> anyhow::Result<bool> {
        if self.unit_path().exists() {
            return Ok(true);
        }
        let listing = self.runner.run(
            &CommandSpec::new("systemctl")
                .args(["list-unit-files", "--no-legend", "--no-pager"])
                .arg(self.unit_name.as_str())
                .captured(),
        )?;
        Ok(listing.success
            && listing
                .stdout
                .lines()
                .any(|line| line.split_whitespace().next() == Some(self.unit_name.as_str())))
    }

    pub fn is_active(&self) -> anyhow::Result<bool> {
        let status = self.runner.run(
            &CommandSpec::new("systemctl")
                .args(["is-active", "--quiet"])
                .arg(self.unit_name.as_str())
                .captured(),
        )?;
        Ok(status.success)
    }

    pub fn state(&self) -> anyhow::Result<UnitState> {
        if !self.is_registered()? {
            return Ok(UnitState::Absent);
        }
        if self.is_active()? {
            return Ok(UnitState::Active);
        }
        Ok(UnitState::Installed)
    }

    /// Stop, disable and delete the registered unit, then reload the
    /// supervisor. Absence is not an error.
    pub fn teardown(&self) -> anyhow::Result<TeardownOutcome> {
        if !self.is_registered()? {
            debug!(unit = %self.unit_name, "no registered unit to tear down");
            return Ok(TeardownOutcome::AlreadyAbsent);
        }

        info!(unit = %self.unit_name, "tearing down existing unit");
        self.systemctl("stop")?;
        self.systemctl("disable")?;
        self.runner.run_checked(
            &CommandSpec::new("rm")
                .arg("-f")
                .path_arg(&self.unit_path())
                .privileged(),
        )?;
        self.daemon_reload()?;
        Ok(TeardownOutcome::Removed)
    }

    /// Write the rendered descriptor into the unit directory.
    pub fn install(&self, descriptor: &ServiceUnitDescriptor) -> anyhow::Result<PathBuf> {
        let mut staged = tempfile::Builder::new()
            .prefix("nowplay-unit")
            .suffix(".service")
            .tempfile()
            .context("Failed to create staging file for unit descriptor")?;
        staged
            .write_all(descriptor.render().as_bytes())
            .context("Failed to write staged unit descriptor")?;
        staged.flush()?;

        let unit_path = self.unit_path();
        info!(unit = %self.unit_name, path = %unit_path.display(), "installing unit descriptor");
        self.copy_into_place(staged.path(), &unit_path)?;
        Ok(unit_path)
    }

    /// Reload, start, and enable on boot.
    pub fn activate(&self) -> anyhow::Result<()> {
        self.daemon_reload()?;
        info!(unit = %self.unit_name, "starting unit");
        self.systemctl("start")?;
        self.systemctl("enable")?;
        Ok(())
    }

    /// Stop the unit if registered. Returns whether a stop was issued.
    pub fn stop(&self) -> anyhow::Result<bool> {
        if !self.is_registered()? {
            debug!(unit = %self.unit_name, "no registered unit to stop");
            return Ok(false);
        }
        info!(unit = %self.unit_name, "stopping unit");
        self.systemctl("stop")?;
        Ok(true)
    }

    fn copy_into_place(&self, staged: &Path, unit_path: &Path) -> anyhow::Result<()> {
        self.runner.run_checked(
            &CommandSpec::new("install")
                .args(["-D", "-m", "0644"])
                .path_arg(staged)
                .path_arg(unit_path)
                .privileged(),
        )?;
        Ok(())
    }

    fn daemon_reload(&self) -> anyhow::Result<()> {
        self.runner
            .run_checked(&CommandSpec::new("systemctl").arg("daemon-reload").privileged())?;
        Ok(())
    }

    fn systemctl(&self, verb: &str) -> anyhow::Result<()> {
        self.runner.run_checked(
            &CommandSpec::new("systemctl")
                .arg(verb)
                .arg(self.unit_name.as_str())
                .privileged(),
        )?;
        Ok(())
    }
}
