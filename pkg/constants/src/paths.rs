//! Filesystem path constants.

/// Default config file path.
pub const DEFAULT_CONFIG: &str = "/etc/nsvault/config.yaml";

/// Default root for working directories and temporary credentials.
pub const DEFAULT_WORKING_DIR: &str = ".";

// ─── Per-run scratch (relative to the working dir) ────────────────────────

/// Clone of the general resource repository.
pub const BACKUP_SUBDIR: &str = "backup";

/// Clone of the secret repository.
pub const SECRET_SUBDIR: &str = "secret";

/// Temporary SSH private key written from inline configuration.
pub const TEMP_SSH_KEY: &str = "ssh_key";

/// Temporary CA certificate written from inline configuration.
pub const TEMP_CA_CERT: &str = "ca.crt";

/// File mode of temporary credential files.
pub const TEMP_CREDENTIAL_MODE: u32 = 0o600;

/// Extension of serialized resource files.
pub const RESOURCE_FILE_EXT: &str = "yaml";
