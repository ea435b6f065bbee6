use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::backup::run_full_backup;
use crate::connector::Connector;
use crate::settings::Settings;

/// What a scheduler did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    /// Runs that finished, successfully or not.
    pub runs: usize,
    /// Finished runs that ended in a fatal error.
    pub failures: usize,
    /// A run was in flight when shutdown arrived and was abandoned.
    pub interrupted: bool,
}

/// Runs a full backup immediately and then once per interval.
///
/// A failed run is logged and the next one happens on schedule. Runs never
/// overlap; a tick that falls due while a run is still going is skipped.
pub struct BackupScheduler<'a, K: Connector> {
    settings: &'a Settings,
    connector: &'a K,
    interval: Duration,
}

impl<'a, K: Connector> BackupScheduler<'a, K> {
    pub fn new(settings: &'a Settings, connector: &'a K) -> Self {
        Self {
            settings,
            connector,
            interval: settings.backup_interval,
        }
    }

    /// Loop until `shutdown` completes. A run in progress at that moment is
    /// dropped, which removes its scratch space without pushing anything.
    pub async fn run_until<F>(self, shutdown: F) -> ScheduleStats
    where
        F: Future<Output = ()>,
    {
        info!(
            "BackupScheduler started (interval={}h)",
            self.interval.as_secs() / 3600
        );
        tokio::pin!(shutdown);
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats = ScheduleStats::default();

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Shutdown requested, abandoning the backup in progress");
                    stats.interrupted = true;
                    break;
                }
                result = run_full_backup(self.settings, self.connector) => {
                    stats.runs += 1;
                    if result.is_err() {
                        stats.failures += 1;
                    }
                }
            }
        }

        info!(
            "BackupScheduler stopped after {} runs ({} failed)",
            stats.runs, stats.failures
        );
        stats
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
