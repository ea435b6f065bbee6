use async_trait::async_trait;
use std::path::Path;

/// Failure of a version store operation.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {args}` failed ({status}): {stderr}")]
    Command {
        args: String,
        status: String,
        stderr: String,
    },

    #[error("branch '{0}' does not exist on the remote")]
    MissingBranch(String),
}

/// Result of committing the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Nothing was staged; the branch head did not move.
    Unchanged,
}

/// How a branch was made current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOrigin {
    /// The remote already had the branch and it is now tracked locally.
    Tracked,
    /// The branch was new and was cut from the default branch.
    Created,
}

/// One remote repository used as a branch-per-project archive.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Local checkout the engines write into.
    fn working_dir(&self) -> &Path;

    /// Whether the remote has a branch called `branch`.
    async fn branch_exists(&self, branch: &str) -> Result<bool, GitError>;

    /// Check out an existing remote branch, discarding local changes.
    async fn checkout_branch(&mut self, branch: &str) -> Result<(), GitError>;

    /// Create `branch` from the default branch and check it out.
    async fn create_branch(&mut self, branch: &str) -> Result<(), GitError>;

    /// Track `branch` if the remote has it, otherwise cut it from the default branch.
    async fn checkout_or_create_branch(&mut self, branch: &str) -> Result<BranchOrigin, GitError> {
        if self.branch_exists(branch).await? {
            self.checkout_branch(branch).await?;
            Ok(BranchOrigin::Tracked)
        } else {
            self.create_branch(branch).await?;
            Ok(BranchOrigin::Created)
        }
    }

    /// Stage every change in the working tree and commit it.
    async fn commit_all(&mut self, message: &str) -> Result<CommitOutcome, GitError>;

    /// Push every local branch to the remote.
    async fn push_all(&mut self) -> Result<(), GitError>;
}
