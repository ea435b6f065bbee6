use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams, PostParams};
use kube::config::{
    AuthInfo, Cluster, Context, KubeConfigOptions, Kubeconfig, NamedAuthInfo, NamedCluster,
    NamedContext,
};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use kube::{Client, Config};
use pkg_constants::kinds::LIST_PAGE_SIZE;
use pkg_types::{ResourceDocument, ResourceKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::client::{ApiError, ClusterClient, ProjectSource};

/// Timeout for connecting to the API server and for each response.
const API_TIMEOUT: Duration = Duration::from_secs(30);

const CONTEXT_NAME: &str = "nsvault";

/// Everything needed to reach and authenticate against the cluster API.
#[derive(Debug, Clone)]
pub struct ClusterEndpoint {
    pub host: String,
    pub port: u16,
    pub token: String,
    /// PEM file with the CA that signed the API server certificate.
    pub ca_cert: PathBuf,
    pub project_source: ProjectSource,
}

impl ClusterEndpoint {
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    /// Single-context kubeconfig holding the server, the CA file and the bearer token.
    fn kubeconfig(&self) -> Result<Kubeconfig, ApiError> {
        let token = self.token.trim_end_matches(['\n', '\r']);
        let auth_info: AuthInfo = serde_json::from_value(serde_json::json!({ "token": token }))
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Kubeconfig {
            clusters: vec![NamedCluster {
                name: CONTEXT_NAME.to_string(),
                cluster: Some(Cluster {
                    server: Some(self.base_url()),
                    certificate_authority: Some(self.ca_cert.display().to_string()),
                    ..Default::default()
                }),
            }],
            auth_infos: vec![NamedAuthInfo {
                name: CONTEXT_NAME.to_string(),
                auth_info: Some(auth_info),
            }],
            contexts: vec![NamedContext {
                name: CONTEXT_NAME.to_string(),
                context: Some(Context {
                    cluster: CONTEXT_NAME.to_string(),
                    user: Some(CONTEXT_NAME.to_string()),
                    ..Default::default()
                }),
            }],
            current_context: Some(CONTEXT_NAME.to_string()),
            ..Default::default()
        })
    }
}

/// Cluster client on top of kube's dynamic API, so any catalogued kind can be
/// listed, fetched and created without a typed struct for it.
pub struct KubeClusterClient {
    client: Client,
    project_source: ProjectSource,
}

impl KubeClusterClient {
    /// Build a client trusting only the configured CA certificate.
    pub async fn connect(endpoint: &ClusterEndpoint) -> Result<Self, ApiError> {
        info!("Connecting to cluster API {}", endpoint.base_url());

        let ca_path = endpoint.ca_cert.display().to_string();
        let pem = tokio::fs::read(&endpoint.ca_cert)
            .await
            .map_err(|e| ApiError::Certificate {
                path: ca_path.clone(),
                reason: e.to_string(),
            })?;
        if pem.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::Certificate {
                path: ca_path,
                reason: "file exists but is empty".to_string(),
            });
        }

        let mut config =
            Config::from_custom_kubeconfig(endpoint.kubeconfig()?, &KubeConfigOptions::default())
                .await
                .map_err(|e| ApiError::Certificate {
                    path: ca_path,
                    reason: e.to_string(),
                })?;
        config.connect_timeout = Some(API_TIMEOUT);
        config.read_timeout = Some(API_TIMEOUT);
        let client = Client::try_from(config).map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self::from_client(client, endpoint.project_source))
    }

    /// Wrap an already configured kube client.
    pub fn from_client(client: Client, project_source: ProjectSource) -> Self {
        Self {
            client,
            project_source,
        }
    }

    fn namespaced(&self, kind: &ResourceKind, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &api_resource(kind))
    }

    /// Follow `continue` tokens until the list is exhausted.
    async fn list_names(
        &self,
        api: &Api<DynamicObject>,
        what: &str,
    ) -> Result<Vec<String>, ApiError> {
        let mut names = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut params = ListParams::default().limit(LIST_PAGE_SIZE);
            if let Some(t) = &token {
                params = params.continue_token(t);
            }
            debug!("Listing {} (continue={})", what, token.is_some());
            let page = api
                .list(&params)
                .await
                .map_err(|e| ApiError::from_kube(what, e))?;

            for item in page.items {
                let name = item.metadata.name.ok_or_else(|| ApiError::Decode {
                    resource: what.to_string(),
                    reason: "list item without metadata.name".to_string(),
                })?;
                names.push(name);
            }

            match page.metadata.continue_.filter(|t| !t.is_empty()) {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_projects(&self) -> Result<Vec<String>, ApiError> {
        let api = Api::all_with(self.client.clone(), &project_resource(self.project_source));
        self.list_names(&api, &self.project_source.to_string()).await
    }

    async fn list_resource_names(
        &self,
        project: &str,
        kind: &ResourceKind,
    ) -> Result<Vec<String>, ApiError> {
        let what = format!("{} in {}", kind, project);
        self.list_names(&self.namespaced(kind, project), &what).await
    }

    async fn get_resource(
        &self,
        project: &str,
        kind: &ResourceKind,
        name: &str,
    ) -> Result<ResourceDocument, ApiError> {
        let what = format!("{} {}/{}", kind, project, name);
        debug!("Fetching {}", what);
        let object = self
            .namespaced(kind, project)
            .get(name)
            .await
            .map_err(|e| ApiError::from_kube(&what, e))?;
        let value = serde_json::to_value(&object).map_err(|e| ApiError::Decode {
            resource: what,
            reason: e.to_string(),
        })?;
        Ok(ResourceDocument::new(value).export())
    }

    async fn create_resource(
        &self,
        kind: &ResourceKind,
        document: &ResourceDocument,
        target_project: &str,
    ) -> Result<(), ApiError> {
        let what = format!(
            "{} {}/{}",
            kind,
            target_project,
            document.name().unwrap_or_default()
        );
        let object: DynamicObject =
            serde_json::from_value(document.in_namespace(target_project).into_value()).map_err(
                |e| ApiError::Decode {
                    resource: what.clone(),
                    reason: e.to_string(),
                },
            )?;
        debug!("Creating {}", what);
        self.namespaced(kind, target_project)
            .create(&PostParams::default(), &object)
            .await
            .map_err(|e| ApiError::from_kube(&what, e))?;
        Ok(())
    }
}

fn api_resource(kind: &ResourceKind) -> ApiResource {
    ApiResource::from_gvk_with_plural(
        &GroupVersionKind::gvk(kind.group(), kind.version(), kind.name()),
        kind.plural(),
    )
}

fn project_resource(source: ProjectSource) -> ApiResource {
    let (gvk, plural) = match source {
        ProjectSource::Projects => (
            GroupVersionKind::gvk("project.openshift.io", "v1", "Project"),
            "projects",
        ),
        ProjectSource::Namespaces => (GroupVersionKind::gvk("", "v1", "Namespace"), "namespaces"),
    };
    ApiResource::from_gvk_with_plural(&gvk, plural)
}
