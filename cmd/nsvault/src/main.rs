mod telemetry;

use clap::{Args, Parser, Subcommand};
use pkg_backup::{
    BackupScheduler, LiveConnector, Settings, run_full_backup, run_restore, shutdown_signal,
};
use pkg_constants::{env, paths, run};
use pkg_types::config::{BackupConfigFile, load_config_file};
use pkg_types::validate::validate_project_name;
use telemetry::LogFormat;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "nsvault",
    about = "Back up cluster projects to git and restore them"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = paths::DEFAULT_CONFIG)]
    config: String,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Log output format
    #[arg(long, env = env::LOG_FORMAT, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Back up every project now and then once per interval
    Serve,
    /// Back up every project once
    Backup,
    /// Recreate a backed-up project inside an existing project
    Restore(RestoreArgs),
}

#[derive(Args, Debug)]
struct RestoreArgs {
    /// Project whose backup branch is replayed
    #[arg(long)]
    backup_project_name: String,

    /// Existing project the resources are created in
    #[arg(long)]
    restore_project_name: String,
}

/// Settings accepted as flags or environment variables. Both win over the config file.
#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(long, global = true, env = env::CLUSTER_HOST)]
    cluster_host: Option<String>,

    #[arg(long, global = true, env = env::CLUSTER_PORT)]
    cluster_port: Option<u16>,

    #[arg(long, global = true, env = env::CLUSTER_TOKEN, hide_env_values = true)]
    cluster_token: Option<String>,

    /// Path to the cluster CA certificate
    #[arg(long, global = true, env = env::CA_CERT_FILE)]
    ca_cert_file: Option<String>,

    /// Cluster CA certificate content
    #[arg(long, global = true, env = env::CA_CERT_INLINE, hide_env_values = true)]
    ca_cert: Option<String>,

    /// `projects` or `namespaces`
    #[arg(long, global = true, env = env::PROJECT_SOURCE)]
    project_source: Option<String>,

    /// Resource kinds kept in the general repository
    #[arg(long, global = true, env = env::RESOURCE_KINDS, value_delimiter = ',')]
    kinds: Option<Vec<String>>,

    #[arg(long, global = true, env = env::BACKUP_REPO)]
    backup_repo: Option<String>,

    #[arg(long, global = true, env = env::SECRET_REPO)]
    secret_repo: Option<String>,

    /// Path to the SSH private key for both repositories
    #[arg(long, global = true, env = env::SSH_KEY_FILE)]
    ssh_key_file: Option<String>,

    /// SSH private key content
    #[arg(long, global = true, env = env::SSH_KEY_INLINE, hide_env_values = true)]
    ssh_key: Option<String>,

    #[arg(long, global = true, env = env::DEFAULT_BRANCH)]
    default_branch: Option<String>,

    #[arg(long, global = true, env = env::AUTHOR_NAME)]
    author_name: Option<String>,

    #[arg(long, global = true, env = env::AUTHOR_EMAIL)]
    author_email: Option<String>,

    #[arg(long, global = true, env = env::WORKING_DIR)]
    working_dir: Option<String>,

    /// Hours between scheduled backups
    #[arg(long, global = true, env = env::BACKUP_INTERVAL)]
    backup_interval: Option<u64>,

    #[arg(long, global = true, env = env::LOG_LEVEL)]
    log_level: Option<String>,
}

impl SettingsArgs {
    fn into_config(self) -> BackupConfigFile {
        BackupConfigFile {
            cluster_host: self.cluster_host,
            cluster_port: self.cluster_port,
            cluster_token: self.cluster_token,
            ca_cert_file: self.ca_cert_file,
            ca_cert: self.ca_cert,
            project_source: self.project_source,
            kinds: self.kinds,
            backup_repo: self.backup_repo,
            secret_repo: self.secret_repo,
            ssh_key_file: self.ssh_key_file,
            ssh_key: self.ssh_key,
            default_branch: self.default_branch,
            author_name: self.author_name,
            author_email: self.author_email,
            working_dir: self.working_dir,
            backup_interval: self.backup_interval,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: BackupConfigFile = load_config_file(&cli.config)?;

    // Merge: CLI args > env > config file > defaults
    let merged = file_cfg.overlay(cli.settings.into_config());
    telemetry::init(
        merged.log_level.as_deref().unwrap_or(run::DEFAULT_LOG_LEVEL),
        cli.log_format,
    );
    info!("Config file: {}", cli.config);

    let settings = match Settings::resolve(merged) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    info!("Starting nsvault");
    settings.log_summary();

    let connector = LiveConnector;
    match cli.command {
        Command::Serve => {
            let stats = BackupScheduler::new(&settings, &connector)
                .run_until(shutdown_signal())
                .await;
            println!(
                "{} backups run, {} failed{}",
                stats.runs,
                stats.failures,
                if stats.interrupted {
                    ", last one interrupted"
                } else {
                    ""
                }
            );
        }
        Command::Backup => {
            tokio::select! {
                result = run_full_backup(&settings, &connector) => {
                    let report = result?;
                    for gap in &report.gaps {
                        println!("skipped {}", gap);
                    }
                    println!("{}", report.summary());
                }
                _ = shutdown_signal() => anyhow::bail!("interrupted before the backup finished"),
            }
        }
        Command::Restore(args) => {
            validate_project_name(&args.backup_project_name)?;
            validate_project_name(&args.restore_project_name)?;
            tokio::select! {
                result = run_restore(
                    &settings,
                    &connector,
                    &args.backup_project_name,
                    &args.restore_project_name,
                ) => {
                    let report = result?;
                    for failure in &report.failures {
                        println!("not restored {}", failure);
                    }
                    println!("{}", report.summary());
                }
                _ = shutdown_signal() => anyhow::bail!("interrupted before the restore finished"),
            }
        }
    }

    Ok(())
}
