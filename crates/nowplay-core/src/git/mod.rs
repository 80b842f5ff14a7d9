//! Git operations for keeping the application working copy in sync.
//!
//! - Cloning the canonical remote into a fresh installation root
//! - Re-imaging an existing working copy to the remote ref

mod spec;
mod sync;

pub use spec::{DEFAULT_REFERENCE, DEFAULT_REMOTE_URL, REMOTE_NAME, RemoteSpec};
pub use sync::{RepositoryState, RepositorySynchronizer, SyncMode, SyncResult};
