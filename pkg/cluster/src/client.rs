use async_trait::async_trait;
use pkg_types::{ResourceDocument, ResourceKind};
use std::fmt;
use std::str::FromStr;

/// Failure talking to the cluster API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid cluster connection settings: {0}")]
    Config(String),

    #[error("CA certificate {path}: {reason}")]
    Certificate { path: String, reason: String },

    #[error("request for {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: kube::Error,
    },

    #[error("{resource} returned {status}: {message}")]
    Status {
        resource: String,
        status: u16,
        message: String,
    },

    #[error("unexpected object for {resource}: {reason}")]
    Decode { resource: String, reason: String },
}

impl ApiError {
    /// Sort a kube failure into a server answer or a transport problem.
    pub(crate) fn from_kube(resource: impl Into<String>, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(status) => ApiError::Status {
                resource: resource.into(),
                status: status.code,
                message: status.message.clone(),
            },
            source => ApiError::Transport {
                resource: resource.into(),
                source,
            },
        }
    }

    /// HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The resource already exists in the target namespace.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Where the list of projects comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSource {
    /// OpenShift `project.openshift.io/v1` projects.
    #[default]
    Projects,
    /// Plain Kubernetes namespaces.
    Namespaces,
}

impl FromStr for ProjectSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "projects" | "project" => Ok(ProjectSource::Projects),
            "namespaces" | "namespace" => Ok(ProjectSource::Namespaces),
            other => Err(format!(
                "'{}' is not a project source, use `projects` or `namespaces`",
                other
            )),
        }
    }
}

impl fmt::Display for ProjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectSource::Projects => write!(f, "projects"),
            ProjectSource::Namespaces => write!(f, "namespaces"),
        }
    }
}

/// Capability the engines need from the cluster.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Names of every project visible to the credentials.
    async fn list_projects(&self) -> Result<Vec<String>, ApiError>;

    /// Names of every resource of `kind` in `project`.
    async fn list_resource_names(
        &self,
        project: &str,
        kind: &ResourceKind,
    ) -> Result<Vec<String>, ApiError>;

    /// Fetch one resource, exported for backup.
    async fn get_resource(
        &self,
        project: &str,
        kind: &ResourceKind,
        name: &str,
    ) -> Result<ResourceDocument, ApiError>;

    /// Create `document` in `target_project`.
    async fn create_resource(
        &self,
        kind: &ResourceKind,
        document: &ResourceDocument,
        target_project: &str,
    ) -> Result<(), ApiError>;
}
