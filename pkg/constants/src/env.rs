//! Environment variable names read by the process configuration layer.

// ─── Cluster API ─────────────────────────────────────────────────────────

pub const CLUSTER_HOST: &str = "KUBERNETES_SERVICE_HOST";
pub const CLUSTER_PORT: &str = "KUBERNETES_SERVICE_PORT";
pub const CLUSTER_TOKEN: &str = "KUBERNETES_TOKEN";

/// Path to the cluster CA certificate. Wins over [`CA_CERT_INLINE`].
pub const CA_CERT_FILE: &str = "SERVICE_CERT_FILENAME";

/// PEM content of the cluster CA certificate.
pub const CA_CERT_INLINE: &str = "SERVICE_CERT";

/// `projects` (OpenShift) or `namespaces` (plain Kubernetes).
pub const PROJECT_SOURCE: &str = "PROJECT_SOURCE";

/// Comma-separated list of resource kinds written to the general store.
pub const RESOURCE_KINDS: &str = "RESOURCES_TO_BACKUP";

// ─── Git ──────────────────────────────────────────────────────────────────

pub const BACKUP_REPO: &str = "BACKUP_GIT_REPO";
pub const SECRET_REPO: &str = "SECRET_GIT_REPO";

/// Path to the SSH private key used for both remotes. Wins over [`SSH_KEY_INLINE`].
pub const SSH_KEY_FILE: &str = "GIT_SSH_PRIVATE_KEY_LOC";

/// PEM content of the SSH private key.
pub const SSH_KEY_INLINE: &str = "GIT_SSH_PRIVATE_KEY";

pub const DEFAULT_BRANCH: &str = "GIT_DEFAULT_BRANCH";
pub const AUTHOR_NAME: &str = "GIT_AUTHOR_NAME";
pub const AUTHOR_EMAIL: &str = "GIT_AUTHOR_EMAIL";

// ─── Process ──────────────────────────────────────────────────────────────

pub const WORKING_DIR: &str = "WORKING_DIR";

/// Hours between two scheduled backups.
pub const BACKUP_INTERVAL: &str = "BACKUP_INTERVAL";

pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// `text` (default) or `json`.
pub const LOG_FORMAT: &str = "LOG_FORMAT";
