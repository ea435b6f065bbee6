use serde::{Deserialize, Serialize};

/// Process configuration file (YAML).
///
/// Every field is optional here; required settings are enforced once all
/// sources (flags, environment, this file) have been merged.
///
/// Example `config.yaml`:
/// ```yaml
/// cluster-host: api.cluster.example.com
/// cluster-port: 6443
/// ca-cert-file: /var/run/secrets/ca.crt
/// backup-repo: git@git.example.com:ops/cluster-backup.git
/// secret-repo: git@git.example.com:ops/cluster-secrets.git
/// ssh-key-file: /etc/nsvault/id_ed25519
/// working-dir: /var/lib/nsvault
/// backup-interval: 12
/// kinds: [Service, ConfigMap, Route]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfigFile {
    #[serde(default, alias = "cluster-host")]
    pub cluster_host: Option<String>,
    #[serde(default, alias = "cluster-port")]
    pub cluster_port: Option<u16>,
    #[serde(default, alias = "cluster-token")]
    pub cluster_token: Option<String>,
    #[serde(default, alias = "ca-cert-file")]
    pub ca_cert_file: Option<String>,
    #[serde(default, alias = "ca-cert")]
    pub ca_cert: Option<String>,
    #[serde(default, alias = "project-source")]
    pub project_source: Option<String>,
    #[serde(default)]
    pub kinds: Option<Vec<String>>,
    #[serde(default, alias = "backup-repo")]
    pub backup_repo: Option<String>,
    #[serde(default, alias = "secret-repo")]
    pub secret_repo: Option<String>,
    #[serde(default, alias = "ssh-key-file")]
    pub ssh_key_file: Option<String>,
    #[serde(default, alias = "ssh-key")]
    pub ssh_key: Option<String>,
    #[serde(default, alias = "default-branch")]
    pub default_branch: Option<String>,
    #[serde(default, alias = "author-name")]
    pub author_name: Option<String>,
    #[serde(default, alias = "author-email")]
    pub author_email: Option<String>,
    #[serde(default, alias = "working-dir")]
    pub working_dir: Option<String>,
    #[serde(default, alias = "backup-interval")]
    pub backup_interval: Option<u64>,
    #[serde(default, alias = "log-level")]
    pub log_level: Option<String>,
}

impl BackupConfigFile {
    /// Merge two sources; values present in `higher` win.
    pub fn overlay(self, higher: BackupConfigFile) -> BackupConfigFile {
        BackupConfigFile {
            cluster_host: higher.cluster_host.or(self.cluster_host),
            cluster_port: higher.cluster_port.or(self.cluster_port),
            cluster_token: higher.cluster_token.or(self.cluster_token),
            ca_cert_file: higher.ca_cert_file.or(self.ca_cert_file),
            ca_cert: higher.ca_cert.or(self.ca_cert),
            project_source: higher.project_source.or(self.project_source),
            kinds: higher.kinds.or(self.kinds),
            backup_repo: higher.backup_repo.or(self.backup_repo),
            secret_repo: higher.secret_repo.or(self.secret_repo),
            ssh_key_file: higher.ssh_key_file.or(self.ssh_key_file),
            ssh_key: higher.ssh_key.or(self.ssh_key),
            default_branch: higher.default_branch.or(self.default_branch),
            author_name: higher.author_name.or(self.author_name),
            author_email: higher.author_email.or(self.author_email),
            working_dir: higher.working_dir.or(self.working_dir),
            backup_interval: higher.backup_interval.or(self.backup_interval),
            log_level: higher.log_level.or(self.log_level),
        }
    }
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
