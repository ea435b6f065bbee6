//! Per-run scratch space: the two working clones and temporary credentials.
//!
//! Everything created here is removed by [`RunScratch::cleanup`], which also runs on
//! drop, so a run that fails or whose future is dropped mid-flight leaves nothing behind.

use pkg_constants::paths::{
    BACKUP_SUBDIR, SECRET_SUBDIR, TEMP_CA_CERT, TEMP_CREDENTIAL_MODE, TEMP_SSH_KEY,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::BackupError;
use crate::settings::{CredentialSource, Settings};

pub struct RunScratch {
    backup_dir: PathBuf,
    secret_dir: PathBuf,
    ca_cert: PathBuf,
    ssh_key: PathBuf,
    temp_files: Vec<PathBuf>,
    cleaned: bool,
}

impl RunScratch {
    /// Clear leftovers of an earlier run and write inline credentials to disk.
    pub fn prepare(settings: &Settings) -> Result<Self, BackupError> {
        let root = &settings.working_dir;
        fs::create_dir_all(root).map_err(|source| BackupError::Scratch {
            path: root.clone(),
            source,
        })?;

        let mut scratch = Self {
            backup_dir: root.join(BACKUP_SUBDIR),
            secret_dir: root.join(SECRET_SUBDIR),
            ca_cert: PathBuf::new(),
            ssh_key: PathBuf::new(),
            temp_files: Vec::new(),
            cleaned: false,
        };

        for dir in [&scratch.backup_dir, &scratch.secret_dir] {
            remove_dir(dir).map_err(|source| BackupError::Scratch {
                path: dir.clone(),
                source,
            })?;
        }

        scratch.ca_cert = scratch.materialize(&settings.ca_cert, &root.join(TEMP_CA_CERT))?;
        scratch.ssh_key = scratch.materialize(&settings.ssh_key, &root.join(TEMP_SSH_KEY))?;
        Ok(scratch)
    }

    /// Path of the credential, writing inline content to `temp_path` first.
    fn materialize(
        &mut self,
        source: &CredentialSource,
        temp_path: &Path,
    ) -> Result<PathBuf, BackupError> {
        match source {
            CredentialSource::File(path) => Ok(path.clone()),
            CredentialSource::Inline(content) => {
                // Tracked before writing so a partial write is still cleaned up.
                self.temp_files.push(temp_path.to_path_buf());
                write_private(temp_path, content).map_err(|source| BackupError::Scratch {
                    path: temp_path.to_path_buf(),
                    source,
                })?;
                debug!("Wrote temporary credential {}", temp_path.display());
                Ok(temp_path.to_path_buf())
            }
        }
    }

    /// Working clone of the general repository.
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Working clone of the secret repository.
    pub fn secret_dir(&self) -> &Path {
        &self.secret_dir
    }

    pub fn ca_cert(&self) -> &Path {
        &self.ca_cert
    }

    pub fn ssh_key(&self) -> &Path {
        &self.ssh_key
    }

    /// Remove both working directories and every temporary credential file.
    /// Safe to call more than once.
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        for dir in [&self.backup_dir, &self.secret_dir] {
            if let Err(e) = remove_dir(dir) {
                warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
        for file in self.temp_files.drain(..) {
            match fs::remove_file(&file) {
                Ok(()) => debug!("Removed temporary credential {}", file.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", file.display(), e),
            }
        }
    }
}

impl Drop for RunScratch {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn remove_dir(dir: &Path) -> std::io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Write a credential readable by the owner only. ssh refuses keys without a
/// trailing newline, so one is added when missing.
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(TEMP_CREDENTIAL_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    #[cfg(unix)]
    {
        // The mode above only applies to newly created files.
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(TEMP_CREDENTIAL_MODE))?;
    }
    Ok(())
}
