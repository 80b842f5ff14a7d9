//! Settings store for loading and saving provision.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::ProvisionSettings;

pub const SETTINGS_FILE_NAME: &str = "provision.toml";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_path: PathBuf,
}

impl SettingsStore {
    /// Store at `<config dir>/nowplay/provision.toml`.
    pub fn from_default_location() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("nowplay");
        Ok(Self::from_dir(config_dir))
    }

    pub fn from_dir(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join(SETTINGS_FILE_NAME),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load and validate settings. A missing file yields defaults.
    pub fn load(&self) -> anyhow::Result<ProvisionSettings> {
        let settings = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path).with_context(|| {
                format!(
                    "Failed to read settings file: {}",
                    self.settings_path.display()
                )
            })?;
            toml::from_str(&content).with_context(|| {
                format!(
                    "Failed to parse settings file: {}",
                    self.settings_path.display()
                )
            })?
        } else {
            ProvisionSettings::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, settings: &ProvisionSettings) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(settings).context("Failed to serialize settings to TOML")?;
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.settings_path, content).with_context(|| {
            format!(
                "Failed to write settings file: {}",
                self.settings_path.display()
            )
        })?;
        Ok(())
    }
}
