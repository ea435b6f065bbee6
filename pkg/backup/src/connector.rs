use async_trait::async_trait;
use pkg_cluster::{ApiError, ClusterClient, ClusterEndpoint, KubeClusterClient};
use pkg_vcs::{GitError, GitRemote, GitRepo, VersionStore};
use std::path::Path;

use crate::settings::Settings;

/// Builds the collaborators of one run. The run owns what is returned.
#[async_trait]
pub trait Connector: Send + Sync {
    type Cluster: ClusterClient;
    type Store: VersionStore;

    async fn connect_cluster(
        &self,
        settings: &Settings,
        ca_cert: &Path,
    ) -> Result<Self::Cluster, ApiError>;

    /// Produce a fresh local clone of `remote` in `working_dir`.
    async fn open_store(
        &self,
        settings: &Settings,
        remote: &str,
        working_dir: &Path,
        ssh_key: &Path,
    ) -> Result<Self::Store, GitError>;
}

/// kube cluster client and `git` subprocess stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveConnector;

#[async_trait]
impl Connector for LiveConnector {
    type Cluster = KubeClusterClient;
    type Store = GitRepo;

    async fn connect_cluster(
        &self,
        settings: &Settings,
        ca_cert: &Path,
    ) -> Result<KubeClusterClient, ApiError> {
        let endpoint = ClusterEndpoint {
            host: settings.cluster_host.clone(),
            port: settings.cluster_port,
            token: settings.cluster_token.clone(),
            ca_cert: ca_cert.to_path_buf(),
            project_source: settings.project_source,
        };
        KubeClusterClient::connect(&endpoint).await
    }

    async fn open_store(
        &self,
        settings: &Settings,
        remote: &str,
        working_dir: &Path,
        ssh_key: &Path,
    ) -> Result<GitRepo, GitError> {
        let remote = GitRemote {
            url: remote.to_string(),
            ssh_key: Some(ssh_key.to_path_buf()),
            default_branch: settings.default_branch.clone(),
            identity: settings.identity.clone(),
        };
        GitRepo::ensure_clone(remote, working_dir).await
    }
}
