use pkg_cluster::ClusterClient;
use pkg_types::ResourceKind;
use pkg_vcs::VersionStore;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::connector::Connector;
use crate::error::BackupError;
use crate::layout;
use crate::report::{Gap, RestoreReport, StoreRole};
use crate::scratch::RunScratch;
use crate::settings::Settings;

/// Recreate the resources backed up for `source` inside `target`.
///
/// Scratch space is removed before this returns, as for a backup run.
pub async fn run_restore<K: Connector>(
    settings: &Settings,
    connector: &K,
    source: &str,
    target: &str,
) -> Result<RestoreReport, BackupError> {
    info!("Restoring project {} into {}", source, target);
    let mut scratch = RunScratch::prepare(settings)?;
    let result = restore_in(settings, connector, &scratch, source, target).await;
    scratch.cleanup();

    match &result {
        Ok(report) => {
            for failure in &report.failures {
                warn!("Not restored: {}", failure);
            }
            info!("Restore complete: {}", report.summary());
        }
        Err(e) => error!("Restore failed: {}", e),
    }
    result
}

async fn restore_in<K: Connector>(
    settings: &Settings,
    connector: &K,
    scratch: &RunScratch,
    source: &str,
    target: &str,
) -> Result<RestoreReport, BackupError> {
    let cluster = connector
        .connect_cluster(settings, scratch.ca_cert())
        .await
        .map_err(BackupError::Connect)?;
    let mut general = connector
        .open_store(
            settings,
            &settings.backup_repo,
            scratch.backup_dir(),
            scratch.ssh_key(),
        )
        .await
        .map_err(|source| BackupError::Clone {
            store: StoreRole::General,
            source,
        })?;
    let mut secrets = connector
        .open_store(
            settings,
            &settings.secret_repo,
            scratch.secret_dir(),
            scratch.ssh_key(),
        )
        .await
        .map_err(|source| BackupError::Clone {
            store: StoreRole::Secret,
            source,
        })?;

    RestoreEngine::new(&cluster, &mut general, &mut secrets, &settings.kinds)
        .restore_project(source, target)
        .await
}

/// Replays a project branch from both stores into a live project.
pub struct RestoreEngine<'a, C: ClusterClient + ?Sized, S: VersionStore> {
    cluster: &'a C,
    general: &'a mut S,
    secrets: &'a mut S,
    kinds: &'a [ResourceKind],
}

impl<'a, C: ClusterClient + ?Sized, S: VersionStore> RestoreEngine<'a, C, S> {
    pub fn new(
        cluster: &'a C,
        general: &'a mut S,
        secrets: &'a mut S,
        kinds: &'a [ResourceKind],
    ) -> Self {
        Self {
            cluster,
            general,
            secrets,
            kinds,
        }
    }

    /// Create every stored resource of branch `source` in project `target`.
    ///
    /// The branch must exist in both stores and the target project must exist;
    /// both are checked before anything is created. Secrets are replayed first
    /// so workloads that mount them find them in place.
    pub async fn restore_project(
        &mut self,
        source: &str,
        target: &str,
    ) -> Result<RestoreReport, BackupError> {
        for (role, store) in [
            (StoreRole::General, &*self.general),
            (StoreRole::Secret, &*self.secrets),
        ] {
            match store.branch_exists(source).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(BackupError::MissingBranch {
                        branch: source.to_string(),
                        store: role,
                    });
                }
                Err(e) => {
                    return Err(BackupError::Checkout {
                        branch: source.to_string(),
                        store: role,
                        source: e,
                    });
                }
            }
        }

        let projects = self
            .cluster
            .list_projects()
            .await
            .map_err(BackupError::ListProjects)?;
        if !projects.iter().any(|p| p == target) {
            return Err(BackupError::MissingTarget(target.to_string()));
        }

        for (role, store) in [
            (StoreRole::General, &mut *self.general),
            (StoreRole::Secret, &mut *self.secrets),
        ] {
            store
                .checkout_branch(source)
                .await
                .map_err(|e| BackupError::Checkout {
                    branch: source.to_string(),
                    store: role,
                    source: e,
                })?;
        }

        let mut report = RestoreReport::new(source, target);
        replay(
            self.cluster,
            self.secrets.working_dir(),
            StoreRole::Secret,
            &[ResourceKind::secret()],
            target,
            &mut report,
        )
        .await;
        replay(
            self.cluster,
            self.general.working_dir(),
            StoreRole::General,
            self.kinds,
            target,
            &mut report,
        )
        .await;
        Ok(report)
    }
}

/// Create every document under the kind directories of `dir` in `target`.
async fn replay<C: ClusterClient + ?Sized>(
    cluster: &C,
    dir: &Path,
    role: StoreRole,
    kinds: &[ResourceKind],
    target: &str,
    report: &mut RestoreReport,
) {
    log_unrestored_dirs(dir, role, kinds);

    for kind in kinds {
        for stored in &layout::read_all(dir, kind) {
            let stored = match stored {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Unable to read a stored {}: {}", kind, e);
                    report.failures.push(Gap::kind(role, target, kind.name(), e));
                    continue;
                }
            };
            let name = stored
                .document
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| stored.file_stem());

            match cluster.create_resource(kind, &stored.document, target).await {
                Ok(()) => {
                    debug!("Created {}/{} in {}", kind, name, target);
                    report.created += 1;
                }
                Err(e) => {
                    if e.is_conflict() {
                        warn!("{}/{} already exists in {}", kind, name, target);
                    } else {
                        warn!("Unable to create {}/{} in {}", kind, name, target);
                    }
                    debug!("{}", e);
                    report
                        .failures
                        .push(Gap::resource(role, target, kind.name(), &name, e));
                }
            }
        }
    }
}

/// Directories in a branch that are not a restorable kind are left alone.
fn log_unrestored_dirs(dir: &Path, role: StoreRole, kinds: &[ResourceKind]) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        if !kinds.iter().any(|k| k.name() == name) {
            debug!("[{}] ignoring directory {}", role, name);
        }
    }
}
