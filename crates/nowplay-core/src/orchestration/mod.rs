//! Install and update workflows.
//!
//! Steps run strictly in sequence; each failure is tagged with the
//! [`Stage`](crate::error::Stage) it happened in.

mod install;
mod update;

use std::sync::Arc;

use crate::config::ConfigGenerator;
use crate::dependencies::DependencyInstaller;
use crate::error::ProvisionError;
use crate::exec::CommandRunner;
use crate::git::RepositorySynchronizer;
use crate::privilege::PrivilegeGuard;
use crate::service::ServiceUnitManager;
use crate::settings::{InstallationTarget, ProvisionSettings};

pub use install::InstallReport;
pub use update::UpdateReport;

#[derive(Debug)]
pub struct Orchestrator {
    settings: ProvisionSettings,
    runner: Arc<dyn CommandRunner>,
    guard: PrivilegeGuard,
}

impl Orchestrator {
    pub fn new(settings: &ProvisionSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            settings: settings.clone(),
            runner,
            guard: PrivilegeGuard::effective(),
        }
    }

    pub fn with_guard(mut self, guard: PrivilegeGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    fn check_privilege(&self) -> Result<(), ProvisionError> {
        self.guard.check()?;
        Ok(())
    }

    fn target(&self) -> InstallationTarget {
        InstallationTarget::probe(&self.settings.install_root)
    }

    fn dependencies(&self) -> DependencyInstaller {
        DependencyInstaller::from_settings(&self.settings, Arc::clone(&self.runner))
    }

    fn repository(&self) -> RepositorySynchronizer {
        RepositorySynchronizer::new(
            self.settings.repository.clone(),
            self.settings.install_root.clone(),
            Arc::clone(&self.runner),
        )
    }

    fn generator(&self) -> ConfigGenerator {
        ConfigGenerator::new(self.settings.layout())
    }

    fn units(&self) -> ServiceUnitManager {
        ServiceUnitManager::from_settings(&self.settings.service, Arc::clone(&self.runner))
    }
}
