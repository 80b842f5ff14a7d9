//! Now Playing provisioning library
//!
//! Installs and updates the Now Playing e-ink application on a single host:
//! OS packages and the Python environment, the application working copy,
//! its generated configuration, and the systemd unit that runs it.

pub mod config;
pub mod dependencies;
pub mod error;
pub mod exec;
pub mod fs;
pub mod git;
pub mod orchestration;
pub mod privilege;
pub mod service;
pub mod settings;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigAnswers, ConfigGenerator, ConfigurationDocument, DisplayProfile, GeoCoordinates,
        OrientationProfile, Prompter,
    };

    // Execution
    pub use crate::exec::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};

    // Errors
    pub use crate::error::{ProvisionError, Stage};

    // Workflows
    pub use crate::orchestration::{InstallReport, Orchestrator, UpdateReport};
    pub use crate::privilege::PrivilegeGuard;

    // Settings
    pub use crate::settings::{InstallLayout, ProvisionSettings, SettingsStore};
}
