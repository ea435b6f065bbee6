use chrono::{DateTime, Utc};
use pkg_cluster::ClusterClient;
use pkg_types::ResourceKind;
use pkg_types::validate::validate_project_name;
use pkg_vcs::{BranchOrigin, CommitOutcome, VersionStore};
use tracing::{debug, error, info, warn};

use crate::connector::Connector;
use crate::error::BackupError;
use crate::layout;
use crate::report::{BackupReport, Gap, StoreRole};
use crate::scratch::RunScratch;
use crate::settings::Settings;

/// Run one full backup: every project, every configured kind, both stores.
///
/// The run's working directories and temporary credentials are removed before
/// this returns, whatever the outcome, and also if the future is dropped.
pub async fn run_full_backup<K: Connector>(
    settings: &Settings,
    connector: &K,
) -> Result<BackupReport, BackupError> {
    info!("Starting full backup");
    let mut scratch = RunScratch::prepare(settings)?;
    let result = backup_in(settings, connector, &scratch).await;
    scratch.cleanup();

    match &result {
        Ok(report) => {
            for gap in &report.gaps {
                warn!("Incomplete: {}", gap);
            }
            info!("Backup complete: {}", report.summary());
        }
        Err(e) => error!("Backup failed: {}", e),
    }
    result
}

async fn backup_in<K: Connector>(
    settings: &Settings,
    connector: &K,
    scratch: &RunScratch,
) -> Result<BackupReport, BackupError> {
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

    BackupEngine::new(&cluster, &mut general, &mut secrets, &settings.kinds)
        .backup_all_projects()
        .await
}

/// Commit message for one project's backup.
pub fn commit_message(project: &str, at: DateTime<Utc>) -> String {
    format!(
        "Backup of project {} at {}",
        project,
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Dumps every project into its branch of the general and secret stores.
pub struct BackupEngine<'a, C: ClusterClient + ?Sized, S: VersionStore> {
    cluster: &'a C,
    general: &'a mut S,
    secrets: &'a mut S,
    kinds: &'a [ResourceKind],
}

impl<'a, C: ClusterClient + ?Sized, S: VersionStore> BackupEngine<'a, C, S> {
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

    /// Back up every project, then push both stores.
    ///
    /// Only project enumeration and the final pushes are fatal; everything else
    /// is recorded in the report and the run carries on.
    pub async fn backup_all_projects(&mut self) -> Result<BackupReport, BackupError> {
        let projects = self
            .cluster
            .list_projects()
            .await
            .map_err(BackupError::ListProjects)?;
        info!("Found {} projects", projects.len());

        let secret_kinds = [ResourceKind::secret()];
        let mut report = BackupReport::default();

        for project in &projects {
            info!("Backing up project: {}", project);
            report.projects.push(project.clone());

            if let Err(e) = validate_project_name(project) {
                warn!("Skipping project {}: {}", project, e);
                report.gaps.push(Gap::project(StoreRole::General, project, &e));
                report.gaps.push(Gap::project(StoreRole::Secret, project, &e));
                continue;
            }

            let message = commit_message(project, Utc::now());
            backup_project(
                self.cluster,
                &mut *self.general,
                StoreRole::General,
                project,
                self.kinds,
                &message,
                &mut report,
            )
            .await;
            backup_project(
                self.cluster,
                &mut *self.secrets,
                StoreRole::Secret,
                project,
                &secret_kinds,
                &message,
                &mut report,
            )
            .await;
        }

        self.general
            .push_all()
            .await
            .map_err(|source| BackupError::Push {
                store: StoreRole::General,
                source,
            })?;
        self.secrets
            .push_all()
            .await
            .map_err(|source| BackupError::Push {
                store: StoreRole::Secret,
                source,
            })?;

        Ok(report)
    }
}

/// Dump `kinds` of `project` into its branch of `store` and commit.
async fn backup_project<C: ClusterClient + ?Sized, S: VersionStore>(
    cluster: &C,
    store: &mut S,
    role: StoreRole,
    project: &str,
    kinds: &[ResourceKind],
    message: &str,
    report: &mut BackupReport,
) {
    match store.checkout_or_create_branch(project).await {
        Ok(BranchOrigin::Created) => debug!("[{}] created branch {}", role, project),
        Ok(BranchOrigin::Tracked) => debug!("[{}] tracking branch {}", role, project),
        Err(e) => {
            warn!(
                "Unable to switch the {} repository to branch {}, skipping",
                role, project
            );
            debug!("{}", e);
            report.gaps.push(Gap::project(role, project, e));
            return;
        }
    }

    let dir = store.working_dir().to_path_buf();
    for kind in kinds {
        let names = match cluster.list_resource_names(project, kind).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Unable to list {} resources in project {}", kind, project);
                debug!("{}", e);
                report.gaps.push(Gap::kind(role, project, kind.name(), e));
                continue;
            }
        };

        // Listing succeeded, so this dump replaces the previous one.
        if let Err(e) = layout::clear_kind(&dir, kind) {
            warn!("Unable to clear {} in project {}: {}", kind, project, e);
            report.gaps.push(Gap::kind(role, project, kind.name(), e));
            continue;
        }

        for name in names {
            let written = match cluster.get_resource(project, kind, &name).await {
                Ok(document) => {
                    layout::write(&document, &dir, kind, &name).map_err(|e| e.to_string())
                }
                Err(e) => Err(e.to_string()),
            };
            match written {
                Ok(path) => {
                    debug!("Wrote {}", path.display());
                    report.written += 1;
                }
                Err(reason) => {
                    warn!("Unable to backup {}/{} in project {}", kind, name, project);
                    debug!("{}", reason);
                    report
                        .gaps
                        .push(Gap::resource(role, project, kind.name(), &name, reason));
                }
            }
        }
    }

    match store.commit_all(message).await {
        Ok(CommitOutcome::Committed) => {
            info!("[{}] committed {}", role, project);
            report.commits += 1;
        }
        Ok(CommitOutcome::Unchanged) => debug!("[{}] nothing changed in {}", role, project),
        Err(e) => {
            warn!("Unable to commit project {} to the {} repository", project, role);
            debug!("{}", e);
            report.gaps.push(Gap::project(role, project, e));
        }
    }
}
