//! Remote repository specification.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_REMOTE_URL: &str = "https://github.com/nowplay/now-playing.git";
pub const DEFAULT_REFERENCE: &str = "main";
pub const REMOTE_NAME: &str = "origin";

const SUPPORTED_SCHEMES: [&str; 5] = ["https", "http", "ssh", "git", "file"];

/// Canonical remote and the single ref used for both clone and reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSpec {
    pub url: String,
    pub reference: String,
}

impl Default for RemoteSpec {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_URL)
    }
}

impl RemoteSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reference: DEFAULT_REFERENCE.to_string(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// `origin/<ref>`, the target of a hard reset.
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", REMOTE_NAME, self.reference)
    }

    /// Fully qualified remote-tracking ref name.
    pub fn tracking_refname(&self) -> String {
        format!("refs/remotes/{}/{}", REMOTE_NAME, self.reference)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let reference = self.reference.trim();
        if reference.is_empty()
            || reference != self.reference
            || reference.starts_with('-')
            || reference.chars().any(char::is_whitespace)
        {
            anyhow::bail!("Invalid repository reference: {:?}", self.reference);
        }
        if !is_supported_remote(&self.url) {
            anyhow::bail!("Unsupported repository URL: {}", self.url);
        }
        Ok(())
    }
}

fn is_supported_remote(url: &str) -> bool {
    if url.is_empty() || url.starts_with('-') {
        return false;
    }
    if let Ok(parsed) = Url::parse(url) {
        return SUPPORTED_SCHEMES.contains(&parsed.scheme());
    }
    if Path::new(url).is_absolute() {
        return true;
    }
    is_scp_like(url)
}

/// `user@host:path/repo.git`
fn is_scp_like(url: &str) -> bool {
    let Some((user_host, path)) = url.split_once(':') else {
        return false;
    };
    let Some((user, host)) = user_host.split_once('@') else {
        return false;
    };
    !user.is_empty() && !host.is_empty() && !host.contains('/') && !path.is_empty()
}
