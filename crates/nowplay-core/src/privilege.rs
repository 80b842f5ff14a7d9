//! Refuse to provision from a root shell.
//!
//! Privileged steps escalate individually through `sudo`. Running the whole
//! workflow as root would leave root-owned files inside the user-owned
//! installation tree.

use nix::unistd::Uid;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "refusing to run as root (uid {uid}); run as the service user, privileged steps use sudo"
)]
pub struct PrivilegeError {
    pub uid: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PrivilegeGuard {
    uid: u32,
}

impl PrivilegeGuard {
    /// Guard for the current process' effective identity.
    pub fn effective() -> Self {
        Self {
            uid: Uid::effective().as_raw(),
        }
    }

    pub fn with_uid(uid: u32) -> Self {
        Self { uid }
    }

    pub fn check(&self) -> Result<(), PrivilegeError> {
        if Uid::from_raw(self.uid).is_root() {
            return Err(PrivilegeError { uid: self.uid });
        }
        Ok(())
    }
}
