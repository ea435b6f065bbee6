pub mod client;
pub mod kube_client;

pub use client::{ApiError, ClusterClient, ProjectSource};
pub use kube_client::{ClusterEndpoint, KubeClusterClient};
