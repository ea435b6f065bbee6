//! Git defaults.

/// Name of the remote every clone tracks.
pub const REMOTE_NAME: &str = "origin";

/// Branch new project branches are cut from.
pub const DEFAULT_BRANCH: &str = "master";

pub const DEFAULT_AUTHOR_NAME: &str = "nsvault";
pub const DEFAULT_AUTHOR_EMAIL: &str = "nsvault@localhost";
