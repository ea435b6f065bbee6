use pkg_cluster::ApiError;
use pkg_vcs::GitError;
use std::path::PathBuf;

use crate::report::StoreRole;

/// Run-fatal failures. Anything narrower is recorded as a [`crate::Gap`] instead.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("failed to prepare {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect to the cluster: {0}")]
    Connect(#[source] ApiError),

    #[error("failed to enumerate projects: {0}")]
    ListProjects(#[source] ApiError),

    #[error("failed to clone the {store} repository: {source}")]
    Clone {
        store: StoreRole,
        #[source]
        source: GitError,
    },

    #[error("no backup branch '{branch}' in the {store} repository")]
    MissingBranch { branch: String, store: StoreRole },

    #[error("failed to check out '{branch}' in the {store} repository: {source}")]
    Checkout {
        branch: String,
        store: StoreRole,
        #[source]
        source: GitError,
    },

    #[error("restore target project '{0}' does not exist")]
    MissingTarget(String),

    #[error("failed to push the {store} repository: {source}")]
    Push {
        store: StoreRole,
        #[source]
        source: GitError,
    },
}
