//! Scheduling and logging defaults.

/// Hours between two scheduled backups.
pub const DEFAULT_BACKUP_INTERVAL_HOURS: u64 = 24;

/// Log level used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warning";

/// Longest accepted interval between two scheduled backups (one leap year).
pub const MAX_BACKUP_INTERVAL_HOURS: u64 = 24 * 366;
