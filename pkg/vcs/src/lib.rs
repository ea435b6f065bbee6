pub mod git;
pub mod store;

pub use git::{GitIdentity, GitRemote, GitRepo};
pub use store::{BranchOrigin, CommitOutcome, GitError, VersionStore};
