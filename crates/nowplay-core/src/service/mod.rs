//! Process-supervisor (systemd) registration of the application service.

mod descriptor;
mod manager;

pub use descriptor::{RestartPolicy, SERVICE_SECTION, ServiceUnitDescriptor};
pub use manager::{ServiceUnitManager, TeardownOutcome, UnitState};
