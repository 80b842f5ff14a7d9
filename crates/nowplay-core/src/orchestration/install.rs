use std::path::PathBuf;

use tracing::{info, warn};

use super::Orchestrator;
use crate::config::Prompter;
use crate::error::{ProvisionError, Stage, StageContext};
use crate::fs::remove_path_if_exists;
use crate::service::{ServiceUnitDescriptor, ServiceUnitManager, TeardownOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Commit the working copy was cloned at.
    pub commit: String,
    pub config_path: PathBuf,
    pub config_digest: String,
    pub unit_path: PathBuf,
    pub unit_digest: String,
    /// What teardown found before the new unit was registered.
    pub prior_unit: TeardownOutcome,
    /// An earlier installation root was deleted before cloning.
    pub replaced_root: bool,
}

impl Orchestrator {
    /// Provision from scratch. The installation root is replaced; the venv
    /// is reused when present.
    pub fn install(&self, prompter: &dyn Prompter) -> Result<InstallReport, ProvisionError> {
        self.check_privilege()?;
        let target = self.target();

        info!("installing dependencies");
        let deps = self.dependencies().ensure().stage(Stage::Dependencies)?;
        if deps.venv_created {
            info!(
                venv = %self.settings.interpreter.venv_dir.display(),
                "created interpreter environment"
            );
        }

        if target.exists {
            remove_path_if_exists(&target.root).stage(Stage::TargetCleanup)?;
            info!(root = %target.root.display(), "removed stale installation");
        }

        let synced = self.repository().clone_fresh().stage(Stage::Repository)?;

        self.settings.layout().ensure_dirs().stage(Stage::Layout)?;

        info!("collecting configuration");
        let config = self
            .generator()
            .generate(prompter)
            .stage(Stage::Configuration)?;

        let units = self.units();
        let prior_unit = units.teardown().stage(Stage::ServiceTeardown)?;

        let descriptor = self
            .settings
            .service
            .resolve_identity()
            .map(|identity| ServiceUnitDescriptor::for_install(&self.settings, &identity))
            .stage(Stage::ServiceInstall)?;
        let unit_path = units
            .install(&descriptor)
            .stage(Stage::ServiceInstall)
            .map_err(|err| rollback(&units, err))?;
        units
            .activate()
            .stage(Stage::ServiceActivate)
            .map_err(|err| rollback(&units, err))?;

        info!(unit = %units.unit_name(), commit = %synced.commit, "installation complete");
        Ok(InstallReport {
            commit: synced.commit,
            config_path: config.path,
            config_digest: config.digest,
            unit_path,
            unit_digest: descriptor.digest(),
            prior_unit,
            replaced_root: target.exists,
        })
    }
}

/// Remove a half-registered unit. The original failure is what gets reported.
fn rollback(units: &ServiceUnitManager, err: ProvisionError) -> ProvisionError {
    warn!(unit = %units.unit_name(), stage = %err.stage(), "rolling back unit registration");
    if let Err(teardown_err) = units.teardown() {
        warn!(error = %format!("{teardown_err:#}"), "rollback teardown failed");
    }
    err
}
