use tracing::info;

use super::Orchestrator;
use crate::config::Prompter;
use crate::error::{ProvisionError, Stage, StageContext};

const REFRESH_PROMPT: &str = "Refresh Python dependencies?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub commit: String,
    /// A registered unit was stopped before the fetch.
    pub stopped_service: bool,
    pub refreshed_dependencies: bool,
    /// Unit left stopped; the operator restarts it.
    pub unit_name: String,
}

impl Orchestrator {
    /// Stop the service, reset the working copy to the remote, and
    /// optionally refresh the interpreter packages. The unit is not restarted.
    pub fn update(&self, prompter: &dyn Prompter) -> Result<UpdateReport, ProvisionError> {
        self.check_privilege()?;
        let target = self.target();
        if !target.exists {
            return Err::<UpdateReport, _>(anyhow::anyhow!(
                "No installation at {}; run install first",
                target.root.display()
            ))
            .stage(Stage::Repository);
        }

        let units = self.units();
        let stopped_service = units.stop().stage(Stage::ServiceStop)?;

        let synced = self.repository().resync().stage(Stage::Repository)?;

        let refreshed_dependencies = prompter
            .confirm(REFRESH_PROMPT, false)
            .stage(Stage::InterpreterRefresh)?;
        if refreshed_dependencies {
            info!("refreshing interpreter packages");
            self.dependencies()
                .refresh_interpreter()
                .stage(Stage::InterpreterRefresh)?;
        }

        info!(
            commit = %synced.commit,
            unit = %units.unit_name(),
            "update complete; unit left stopped"
        );
        Ok(UpdateReport {
            commit: synced.commit,
            stopped_service,
            refreshed_dependencies,
            unit_name: units.unit_name().to_string(),
        })
    }
}
