use pkg_constants::kinds::{DEFAULT_BACKUP_KINDS, SECRET_KIND};
use std::fmt;
use std::str::FromStr;

/// A cluster resource kind together with the API coordinates needed to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    name: &'static str,
    api_version: &'static str,
    plural: &'static str,
}

/// Every kind the cluster client knows how to address.
const CATALOGUE: &[ResourceKind] = &[
    ResourceKind::core("Service", "services"),
    ResourceKind::core("ConfigMap", "configmaps"),
    ResourceKind::core(SECRET_KIND, "secrets"),
    ResourceKind::core("ServiceAccount", "serviceaccounts"),
    ResourceKind::core("PersistentVolumeClaim", "persistentvolumeclaims"),
    ResourceKind::grouped("DeploymentConfig", "apps.openshift.io/v1", "deploymentconfigs"),
    ResourceKind::grouped("BuildConfig", "build.openshift.io/v1", "buildconfigs"),
    ResourceKind::grouped("ImageStream", "image.openshift.io/v1", "imagestreams"),
    ResourceKind::grouped("Route", "route.openshift.io/v1", "routes"),
    ResourceKind::grouped("Template", "template.openshift.io/v1", "templates"),
    ResourceKind::grouped("Deployment", "apps/v1", "deployments"),
    ResourceKind::grouped("StatefulSet", "apps/v1", "statefulsets"),
    ResourceKind::grouped("DaemonSet", "apps/v1", "daemonsets"),
    ResourceKind::grouped("CronJob", "batch/v1", "cronjobs"),
    ResourceKind::grouped("Ingress", "networking.k8s.io/v1", "ingresses"),
];

#[derive(Debug, thiserror::Error)]
#[error("unknown resource kind '{0}'")]
pub struct UnknownKind(pub String);

impl ResourceKind {
    const fn core(name: &'static str, plural: &'static str) -> Self {
        Self {
            name,
            api_version: "v1",
            plural,
        }
    }

    const fn grouped(name: &'static str, api_version: &'static str, plural: &'static str) -> Self {
        Self {
            name,
            api_version,
            plural,
        }
    }

    /// The kind kept in the secret store.
    pub fn secret() -> Self {
        Self::core(SECRET_KIND, "secrets")
    }

    /// Kinds backed up to the general store when nothing is configured.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_BACKUP_KINDS
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }

    /// All known kinds.
    pub fn catalogue() -> &'static [ResourceKind] {
        CATALOGUE
    }

    /// Kind name, also used as the directory name in a backup branch.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn api_version(&self) -> &'static str {
        self.api_version
    }

    pub fn plural(&self) -> &'static str {
        self.plural
    }

    pub fn is_secret(&self) -> bool {
        self.name == SECRET_KIND
    }

    /// API group, empty for the core group.
    pub fn group(&self) -> &'static str {
        self.api_version
            .split_once('/')
            .map_or("", |(group, _)| group)
    }

    pub fn version(&self) -> &'static str {
        self.api_version
            .split_once('/')
            .map_or(self.api_version, |(_, version)| version)
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    /// Looks a kind up by name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CATALOGUE
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| UnknownKind(wanted.to_string()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        let kind: ResourceKind = "configmap".parse().unwrap();
        assert_eq!(kind.name(), "ConfigMap");
        assert_eq!(kind.plural(), "configmaps");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "Widget".parse::<ResourceKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown resource kind 'Widget'");
    }

    #[test]
    fn group_and_version_split_the_api_version() {
        let secret = ResourceKind::secret();
        assert_eq!((secret.group(), secret.version()), ("", "v1"));
        let route: ResourceKind = "Route".parse().unwrap();
        assert_eq!((route.group(), route.version()), ("route.openshift.io", "v1"));
    }

    #[test]
    fn defaults_resolve_and_exclude_secret() {
        let defaults = ResourceKind::defaults();
        assert_eq!(defaults.len(), DEFAULT_BACKUP_KINDS.len());
        assert!(defaults.iter().all(|k| !k.is_secret()));
    }
}
