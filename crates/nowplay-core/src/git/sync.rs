//! Working-copy synchronization against the canonical remote.
//!
//! After either mode completes, the working copy's tracked content equals the
//! tree of `origin/<ref>`. Resync discards uncommitted changes and local
//! commits.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use git2::{Repository, StatusOptions};
use tracing::{debug, info};

use super::spec::{REMOTE_NAME, RemoteSpec};
use crate::exec::{CommandRunner, CommandSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Clone into an absent directory.
    Fresh,
    /// Re-register the remote, fetch and hard-reset an existing working copy.
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryState {
    pub remote_url: String,
    pub reference: String,
    pub working_copy_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub mode: SyncMode,
    /// Commit the working copy now points at.
    pub commit: String,
}

#[derive(Debug)]
pub struct RepositorySynchronizer {
    remote: RemoteSpec,
    working_copy: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl RepositorySynchronizer {
    pub fn new(
        remote: RemoteSpec,
        working_copy: PathBuf,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            remote,
            working_copy,
            runner,
        }
    }

    pub fn state(&self) -> RepositoryState {
        RepositoryState {
            remote_url: self.remote.url.clone(),
            reference: self.remote.reference.clone(),
            working_copy_present: self.working_copy.join(".git").exists(),
        }
    }

    pub fn sync(&self, mode: SyncMode) -> anyhow::Result<SyncResult> {
        match mode {
            SyncMode::Fresh => self.clone_fresh(),
            SyncMode::Resync => self.resync(),
        }
    }

    /// Clone the remote into the working-copy path, which must not exist.
    pub fn clone_fresh(&self) -> anyhow::Result<SyncResult> {
        if self.working_copy.exists() {
            anyhow::bail!(
                "Clone target already exists: {}",
                self.working_copy.display()
            );
        }
        if let Some(parent) = self.working_copy.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        info!(url = %self.remote.url, reference = %self.remote.reference, "cloning repository");
        let clone = CommandSpec::git()
            .args(["clone", "--branch", self.remote.reference.as_str(), "--"])
            .arg(self.remote.url.as_str())
            .path_arg(&self.working_copy);
        self.runner.run_checked(&clone)?;

        let commit = self.verify_matches_remote()?;
        Ok(SyncResult {
            mode: SyncMode::Fresh,
            commit,
        })
    }

    /// Force the existing working copy to match `origin/<ref>`.
    pub fn resync(&self) -> anyhow::Result<SyncResult> {
        if !self.state().working_copy_present {
            anyhow::bail!(
                "No working copy at {}; run install first",
                self.working_copy.display()
            );
        }

        let remove = self
            .git()
            .args(["remote", "remove", REMOTE_NAME])
            .captured();
        let removed = self.runner.run(&remove)?;
        if !removed.success {
            debug!(remote = REMOTE_NAME, "no existing remote registration to remove");
        }

        self.runner.run_checked(
            &self
                .git()
                .args(["remote", "add", REMOTE_NAME])
                .arg(self.remote.url.as_str()),
        )?;

        info!(url = %self.remote.url, reference = %self.remote.reference, "fetching");
        self.runner.run_checked(
            &self
                .git()
                .args(["fetch", REMOTE_NAME])
                .arg(self.remote.reference.as_str()),
        )?;

        self.runner.run_checked(
            &self
                .git()
                .args(["reset", "--hard"])
                .arg(self.remote.tracking_ref()),
        )?;

        let commit = self.verify_matches_remote()?;
        info!(commit = %commit, "working copy reset to {}", self.remote.tracking_ref());
        Ok(SyncResult {
            mode: SyncMode::Resync,
            commit,
        })
    }

    fn git(&self) -> CommandSpec {
        CommandSpec::git().current_dir(&self.working_copy)
    }

    /// Check HEAD's tree against the remote-tracking ref and that no tracked
    /// file differs. Returns the HEAD commit id.
    fn verify_matches_remote(&self) -> anyhow::Result<String> {
        let repo = Repository::open(&self.working_copy).with_context(|| {
            format!(
                "Failed to open working copy: {}",
                self.working_copy.display()
            )
        })?;

        let refname = self.remote.tracking_refname();
        let remote_commit = repo
            .find_reference(&refname)
            .with_context(|| format!("Missing remote-tracking ref {refname}"))?
            .peel_to_commit()?;
        let head_commit = repo
            .head()
            .context("Working copy has no HEAD")?
            .peel_to_commit()?;

        if head_commit.tree_id() != remote_commit.tree_id() {
            anyhow::bail!(
                "HEAD {} does not match {} ({})",
                head_commit.id(),
                self.remote.tracking_ref(),
                remote_commit.id()
            );
        }

        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let statuses = repo.statuses(Some(&mut opts))?;
        if !statuses.is_empty() {
            let dirty: Vec<String> = statuses
                .iter()
                .filter_map(|entry| entry.path().map(str::to_string))
                .collect();
            anyhow::bail!(
                "Working copy still differs from {}: {}",
                self.remote.tracking_ref(),
                dirty.join(", ")
            );
        }

        Ok(head_commit.id().to_string())
    }
}
