//! Directory layout under the installation root.

use std::path::{Path, PathBuf};

use anyhow::Context;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const LOG_FILE_NAME: &str = "now_playing.log";
pub const CACHE_FILE_NAME: &str = "song_cache.json";

/// The single root every component works relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationTarget {
    pub root: PathBuf,
    pub exists: bool,
}

impl InstallationTarget {
    pub fn probe(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            exists: root.exists(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("resources")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("log")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE_NAME)
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir().join(CACHE_FILE_NAME)
    }

    pub fn resource(&self, name: &str) -> PathBuf {
        self.resources_dir().join(name)
    }

    /// Create config, resources, cache and log directories. No-op when present.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [
            self.config_dir(),
            self.resources_dir(),
            self.cache_dir(),
            self.log_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_root() {
        let layout = InstallLayout::new(Path::new("/home/pi/now-playing"));
        assert_eq!(
            layout.config_file(),
            PathBuf::from("/home/pi/now-playing/config/config.yaml")
        );
        assert_eq!(
            layout.log_file(),
            PathBuf::from("/home/pi/now-playing/log/now_playing.log")
        );
        assert_eq!(
            layout.cache_file(),
            PathBuf::from("/home/pi/now-playing/cache/song_cache.json")
        );
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let temp = tempfile::TempDir::new().unwrap();
        let layout = InstallLayout::new(&temp.path().join("root"));
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.config_file(), "keep").unwrap();
        layout.ensure_dirs().unwrap();

        assert!(layout.resources_dir().is_dir());
        assert!(layout.cache_dir().is_dir());
        assert!(layout.log_dir().is_dir());
        assert_eq!(std::fs::read_to_string(layout.config_file()).unwrap(), "keep");
    }

    #[test]
    fn target_reports_existence() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(InstallationTarget::probe(temp.path()).exists);
        assert!(!InstallationTarget::probe(&temp.path().join("missing")).exists);
    }
}
