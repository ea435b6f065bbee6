//! Resource kind constants.

/// Kind stored in the secret repository only.
pub const SECRET_KIND: &str = "Secret";

/// Kinds written to the general repository when none are configured.
pub const DEFAULT_BACKUP_KINDS: &[&str] = &[
    "Service",
    "DeploymentConfig",
    "BuildConfig",
    "ImageStream",
    "Route",
    "ConfigMap",
    "StatefulSet",
];

/// Page size for list calls against the cluster API.
pub const LIST_PAGE_SIZE: u32 = 500;
