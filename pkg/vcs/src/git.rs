use async_trait::async_trait;
use pkg_constants::git::REMOTE_NAME;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::store::{CommitOutcome, GitError, VersionStore};

/// Author recorded on backup commits.
#[derive(Debug, Clone)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// Remote repository coordinates.
#[derive(Debug, Clone)]
pub struct GitRemote {
    pub url: String,
    /// Private key handed to ssh; `None` uses the ambient ssh configuration.
    pub ssh_key: Option<PathBuf>,
    /// Branch new project branches are cut from.
    pub default_branch: String,
    pub identity: GitIdentity,
}

impl GitRemote {
    fn ssh_command(&self) -> Option<String> {
        self.ssh_key.as_ref().map(|key| {
            format!(
                "ssh -i '{}' -o IdentitiesOnly=yes",
                key.display().to_string().replace('\'', r"'\''")
            )
        })
    }
}

/// Version store backed by the `git` binary.
/// Every method is a real subprocess call against a local clone.
pub struct GitRepo {
    remote: GitRemote,
    working_dir: PathBuf,
    program: PathBuf,
}

impl GitRepo {
    /// Clone `remote` into `working_dir` on its default branch, or fetch if a
    /// clone is already there.
    pub async fn ensure_clone(remote: GitRemote, working_dir: &Path) -> Result<Self, GitError> {
        Self::ensure_clone_with(remote, working_dir, Path::new("git")).await
    }

    async fn ensure_clone_with(
        remote: GitRemote,
        working_dir: &Path,
        program: &Path,
    ) -> Result<Self, GitError> {
        let repo = Self {
            remote,
            working_dir: working_dir.to_path_buf(),
            program: program.to_path_buf(),
        };

        if working_dir.join(".git").exists() {
            info!("Fetching {} into {}", repo.remote.url, working_dir.display());
            repo.git(&["fetch", "--prune", REMOTE_NAME]).await?;
        } else {
            info!("Cloning git repo {} into {}", repo.remote.url, working_dir.display());
            let target = working_dir.display().to_string();
            repo.run(
                None,
                &[
                    "clone",
                    "--quiet",
                    "--origin",
                    REMOTE_NAME,
                    "--branch",
                    &repo.remote.default_branch,
                    &repo.remote.url,
                    &target,
                ],
            )
            .await?;
        }
        Ok(repo)
    }

    pub fn remote(&self) -> &GitRemote {
        &self.remote
    }

    /// Run git inside the working directory and return stdout.
    async fn git(&self, args: &[&str]) -> Result<String, GitError> {
        self.run(Some(&self.working_dir), args).await
    }

    async fn run(&self, cwd: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let joined = args.join(" ");
        debug!("git {}", joined);

        let mut cmd = Command::new(&self.program);
        if let Some(dir) = cwd {
            cmd.arg("-C").arg(dir);
        }
        // A dropped run must not leave a clone or push running behind its cleanup.
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);
        if let Some(ssh) = self.remote.ssh_command() {
            cmd.env("GIT_SSH_COMMAND", ssh);
        }

        let output = cmd.output().await.map_err(|source| GitError::Spawn {
            args: joined.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::Command {
                args: joined,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Reset the working tree to `start` on branch `branch`, dropping leftovers
    /// from the previously checked out branch.
    async fn switch(&self, branch: &str, start: &str, track: bool) -> Result<(), GitError> {
        let track_flag = if track { "--track" } else { "--no-track" };
        self.git(&["checkout", "--quiet", "--force", track_flag, "-B", branch, start])
            .await?;
        self.git(&["clean", "--quiet", "-fd"]).await?;
        Ok(())
    }
}

#[async_trait]
impl VersionStore for GitRepo {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool, GitError> {
        let remote_ref = format!("refs/remotes/{}/{}", REMOTE_NAME, branch);
        match self
            .git(&["rev-parse", "--verify", "--quiet", &remote_ref])
            .await
        {
            Ok(_) => Ok(true),
            // `--quiet` makes a missing ref a plain exit status 1 with no output.
            Err(GitError::Command { stderr, .. }) if stderr.is_empty() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn checkout_branch(&mut self, branch: &str) -> Result<(), GitError> {
        if !self.branch_exists(branch).await? {
            return Err(GitError::MissingBranch(branch.to_string()));
        }
        let start = format!("{}/{}", REMOTE_NAME, branch);
        self.switch(branch, &start, true).await
    }

    async fn create_branch(&mut self, branch: &str) -> Result<(), GitError> {
        let start = format!("{}/{}", REMOTE_NAME, self.remote.default_branch);
        self.switch(branch, &start, false).await
    }

    async fn commit_all(&mut self, message: &str) -> Result<CommitOutcome, GitError> {
        self.git(&["add", "--all"]).await?;
        let status = self.git(&["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            return Ok(CommitOutcome::Unchanged);
        }

        let name = format!("user.name={}", self.remote.identity.name);
        let email = format!("user.email={}", self.remote.identity.email);
        self.git(&[
            "-c", &name, "-c", &email, "commit", "--quiet", "--no-verify", "-m", message,
        ])
        .await?;
        Ok(CommitOutcome::Committed)
    }

    async fn push_all(&mut self) -> Result<(), GitError> {
        info!("Pushing all branches to {}", self.remote.url);
        self.git(&["push", "--quiet", "--all", REMOTE_NAME]).await?;
        Ok(())
    }
}
