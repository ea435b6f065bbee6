use pkg_cluster::ProjectSource;
use pkg_constants::{env, git, paths, run};
use pkg_types::ResourceKind;
use pkg_types::config::BackupConfigFile;
use pkg_vcs::GitIdentity;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// A required setting is absent or malformed. Raised before any engine runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{setting} must be set ({env})")]
    Missing {
        setting: &'static str,
        env: &'static str,
    },

    #[error("either {file_env} or {inline_env} must be set")]
    MissingCredential {
        file_env: &'static str,
        inline_env: &'static str,
    },

    #[error("invalid {setting}: {reason}")]
    Invalid {
        setting: &'static str,
        reason: String,
    },
}

/// A credential given either as a path on disk or as inline content.
#[derive(Clone)]
pub enum CredentialSource {
    File(PathBuf),
    /// Written to a temporary file for the duration of a run.
    Inline(String),
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CredentialSource::Inline(_) => f.write_str("Inline(<redacted>)"),
        }
    }
}

/// Fully resolved process configuration, built once at startup.
#[derive(Clone)]
pub struct Settings {
    pub cluster_host: String,
    pub cluster_port: u16,
    pub cluster_token: String,
    pub ca_cert: CredentialSource,
    pub project_source: ProjectSource,
    /// Kinds stored in the general repository. Never contains `Secret`.
    pub kinds: Vec<ResourceKind>,
    pub backup_repo: String,
    pub secret_repo: String,
    pub ssh_key: CredentialSource,
    pub default_branch: String,
    pub identity: GitIdentity,
    pub working_dir: PathBuf,
    pub backup_interval: Duration,
    pub log_level: String,
}

impl Settings {
    /// Validate merged configuration sources into settings.
    pub fn resolve(cfg: BackupConfigFile) -> Result<Self, ConfigError> {
        let cluster_host = required(cfg.cluster_host, "cluster host", env::CLUSTER_HOST)?;
        let cluster_port = cfg.cluster_port.ok_or(ConfigError::Missing {
            setting: "cluster port",
            env: env::CLUSTER_PORT,
        })?;
        let cluster_token = required(cfg.cluster_token, "cluster token", env::CLUSTER_TOKEN)?;
        let ca_cert = credential(
            cfg.ca_cert_file,
            cfg.ca_cert,
            env::CA_CERT_FILE,
            env::CA_CERT_INLINE,
        )?;
        let backup_repo = required(cfg.backup_repo, "backup repository", env::BACKUP_REPO)?;
        let secret_repo = required(cfg.secret_repo, "secret repository", env::SECRET_REPO)?;
        let ssh_key = credential(
            cfg.ssh_key_file,
            cfg.ssh_key,
            env::SSH_KEY_FILE,
            env::SSH_KEY_INLINE,
        )?;

        let project_source = match non_empty(cfg.project_source) {
            Some(s) => s.parse::<ProjectSource>().map_err(|reason| ConfigError::Invalid {
                setting: "project source",
                reason,
            })?,
            None => ProjectSource::default(),
        };

        let kinds = match cfg.kinds {
            Some(names) => parse_kinds(&names)?,
            None => ResourceKind::defaults(),
        };

        let hours = cfg
            .backup_interval
            .unwrap_or(run::DEFAULT_BACKUP_INTERVAL_HOURS);
        let backup_interval = backup_interval(hours)?;

        Ok(Self {
            cluster_host,
            cluster_port,
            cluster_token,
            ca_cert,
            project_source,
            kinds,
            backup_repo,
            secret_repo,
            ssh_key,
            default_branch: non_empty(cfg.default_branch)
                .unwrap_or_else(|| git::DEFAULT_BRANCH.to_string()),
            identity: GitIdentity {
                name: non_empty(cfg.author_name)
                    .unwrap_or_else(|| git::DEFAULT_AUTHOR_NAME.to_string()),
                email: non_empty(cfg.author_email)
                    .unwrap_or_else(|| git::DEFAULT_AUTHOR_EMAIL.to_string()),
            },
            working_dir: PathBuf::from(
                non_empty(cfg.working_dir)
                    .unwrap_or_else(|| paths::DEFAULT_WORKING_DIR.to_string()),
            ),
            backup_interval,
            log_level: non_empty(cfg.log_level)
                .unwrap_or_else(|| run::DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Log the effective settings with secrets masked.
    pub fn log_summary(&self) {
        info!("  Cluster:        {}:{}", self.cluster_host, self.cluster_port);
        info!(
            "  Token:          {}***",
            self.cluster_token.chars().take(4).collect::<String>()
        );
        info!("  Projects from:  {}", self.project_source);
        info!(
            "  Kinds:          {}",
            self.kinds
                .iter()
                .map(ResourceKind::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        info!("  Backup repo:    {}", self.backup_repo);
        info!("  Secret repo:    {}", self.secret_repo);
        info!("  Working dir:    {}", self.working_dir.display());
        info!(
            "  Interval:       {}h",
            self.backup_interval.as_secs() / 3600
        );
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(
    value: Option<String>,
    setting: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::Missing { setting, env })
}

/// A file path wins over inline content.
fn credential(
    file: Option<String>,
    inline: Option<String>,
    file_env: &'static str,
    inline_env: &'static str,
) -> Result<CredentialSource, ConfigError> {
    if let Some(path) = non_empty(file) {
        return Ok(CredentialSource::File(PathBuf::from(path)));
    }
    if let Some(content) = non_empty(inline) {
        return Ok(CredentialSource::Inline(content));
    }
    Err(ConfigError::MissingCredential {
        file_env,
        inline_env,
    })
}

/// Interval in hours as a duration, bounded so it always fits a timer deadline.
fn backup_interval(hours: u64) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::Invalid {
        setting: "backup interval",
        reason: format!(
            "must be between 1 and {} hours, got {}",
            run::MAX_BACKUP_INTERVAL_HOURS,
            hours
        ),
    };
    if hours == 0 || hours > run::MAX_BACKUP_INTERVAL_HOURS {
        return Err(invalid());
    }
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

/// Parse the general kind list, dropping duplicates and rejecting `Secret`.
fn parse_kinds(names: &[String]) -> Result<Vec<ResourceKind>, ConfigError> {
    let mut kinds: Vec<ResourceKind> = Vec::new();
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        let kind: ResourceKind = name.parse().map_err(|e: pkg_types::kind::UnknownKind| {
            ConfigError::Invalid {
                setting: "resource kinds",
                reason: e.to_string(),
            }
        })?;
        if kind.is_secret() {
            return Err(ConfigError::Invalid {
                setting: "resource kinds",
                reason: format!("{} is kept in the secret repository", kind),
            });
        }
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
