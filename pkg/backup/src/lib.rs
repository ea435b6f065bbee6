//! Backup and restore orchestration.
//!
//! A run owns its scratch space (two working clones and any temporary
//! credential files) and the collaborators built from [`Settings`]:
//! one [`pkg_cluster::ClusterClient`] and two [`pkg_vcs::VersionStore`]s.

pub mod backup;
pub mod connector;
pub mod error;
pub mod layout;
pub mod report;
pub mod restore;
pub mod schedule;
pub mod scratch;
pub mod settings;

#[cfg(test)]
mod testing;

pub use backup::{BackupEngine, run_full_backup};
pub use connector::{Connector, LiveConnector};
pub use error::BackupError;
pub use report::{BackupReport, Gap, GapScope, RestoreReport, StoreRole};
pub use restore::{RestoreEngine, run_restore};
pub use schedule::{BackupScheduler, ScheduleStats, shutdown_signal};
pub use settings::{ConfigError, CredentialSource, Settings};
