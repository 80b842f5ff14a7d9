//! OS packages and the isolated Python environment.

use std::sync::Arc;

use tracing::{debug, info};

use crate::exec::{CommandRunner, CommandSpec};
use crate::settings::{InterpreterSettings, ProvisionSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyReport {
    pub venv_created: bool,
}

#[derive(Debug)]
pub struct DependencyInstaller {
    system_packages: Vec<String>,
    interpreter: InterpreterSettings,
    runner: Arc<dyn CommandRunner>,
}

impl DependencyInstaller {
    pub fn new(
        system_packages: Vec<String>,
        interpreter: InterpreterSettings,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            system_packages,
            interpreter,
            runner,
        }
    }

    pub fn from_settings(settings: &ProvisionSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(
            settings.system_packages.clone(),
            settings.interpreter.clone(),
            runner,
        )
    }

    /// Run every step in order. The first failure aborts the rest.
    pub fn ensure(&self) -> anyhow::Result<DependencyReport> {
        self.ensure_system_packages()?;
        let venv_created = self.ensure_interpreter_env()?;
        self.install_manifest()?;
        Ok(DependencyReport { venv_created })
    }

    /// Refresh the package index, upgrade, and install the fixed package list.
    pub fn ensure_system_packages(&self) -> anyhow::Result<()> {
        info!("refreshing package index");
        self.apt(["update"])?;
        info!("upgrading installed packages");
        self.apt(["-y", "upgrade"])?;
        if self.system_packages.is_empty() {
            return Ok(());
        }
        info!(count = self.system_packages.len(), "installing system packages");
        self.runner.run_checked(
            &CommandSpec::new("apt-get")
                .args(["install", "-y"])
                .args(self.system_packages.iter().cloned())
                .privileged(),
        )?;
        Ok(())
    }

    /// Create the venv when absent. Returns whether it was created.
    pub fn ensure_interpreter_env(&self) -> anyhow::Result<bool> {
        let venv = &self.interpreter.venv_dir;
        if venv.exists() {
            debug!(venv = %venv.display(), "interpreter environment already present");
            return Ok(false);
        }
        info!(venv = %venv.display(), "creating interpreter environment");
        self.runner.run_checked(
            &CommandSpec::new(self.interpreter.python.as_str())
                .args(["-m", "venv", "--system-site-packages"])
                .path_arg(venv),
        )?;
        Ok(true)
    }

    /// Install or upgrade the dependency manifest inside the venv.
    pub fn install_manifest(&self) -> anyhow::Result<()> {
        let pip = self.interpreter.venv_pip();
        self.runner.run_checked(
            &CommandSpec::new(pip.to_string_lossy()).args(["install", "--upgrade", "pip"]),
        )?;
        if self.interpreter.packages.is_empty() {
            return Ok(());
        }
        info!(count = self.interpreter.packages.len(), "installing interpreter packages");
        self.runner.run_checked(
            &CommandSpec::new(pip.to_string_lossy())
                .args(["install", "--upgrade"])
                .args(self.interpreter.packages.iter().cloned()),
        )?;
        Ok(())
    }

    /// Re-run the manifest install in an existing venv.
    pub fn refresh_interpreter(&self) -> anyhow::Result<()> {
        if !self.interpreter.venv_dir.exists() {
            anyhow::bail!(
                "Interpreter environment missing at {}; run install first",
                self.interpreter.venv_dir.display()
            );
        }
        self.install_manifest()
    }

    fn apt<const N: usize>(&self, args: [&str; N]) -> anyhow::Result<()> {
        self.runner
            .run_checked(&CommandSpec::new("apt-get").args(args).privileged())?;
        Ok(())
    }
}
