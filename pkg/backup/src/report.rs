use std::fmt;

/// Which of the two repositories an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreRole {
    /// Every configured kind except secrets.
    General,
    /// Secrets only, kept apart for access control.
    Secret,
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRole::General => write!(f, "backup"),
            StoreRole::Secret => write!(f, "secret"),
        }
    }
}

/// How much of a project a gap covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapScope {
    /// One store's half of a project was skipped.
    Project,
    /// One kind of one project was skipped.
    Kind,
    /// A single resource was skipped.
    Resource,
}

/// A recoverable failure, recorded with enough context to locate the hole
/// it left in the repository or in the restored project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub store: StoreRole,
    pub project: String,
    pub kind: Option<String>,
    pub resource: Option<String>,
    pub reason: String,
}

impl Gap {
    pub fn project(store: StoreRole, project: &str, reason: impl ToString) -> Self {
        Self {
            store,
            project: project.to_string(),
            kind: None,
            resource: None,
            reason: reason.to_string(),
        }
    }

    pub fn kind(store: StoreRole, project: &str, kind: &str, reason: impl ToString) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::project(store, project, reason)
        }
    }

    pub fn resource(
        store: StoreRole,
        project: &str,
        kind: &str,
        resource: &str,
        reason: impl ToString,
    ) -> Self {
        Self {
            resource: Some(resource.to_string()),
            ..Self::kind(store, project, kind, reason)
        }
    }

    pub fn scope(&self) -> GapScope {
        match (&self.kind, &self.resource) {
            (_, Some(_)) => GapScope::Resource,
            (Some(_), None) => GapScope::Kind,
            (None, None) => GapScope::Project,
        }
    }
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.store, self.project)?;
        if let Some(kind) = &self.kind {
            write!(f, "/{}", kind)?;
        }
        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Outcome of one full backup run that reached the final push.
#[derive(Debug, Clone, Default)]
pub struct BackupReport {
    /// Every project enumerated for this run.
    pub projects: Vec<String>,
    /// Resource files written across both stores.
    pub written: usize,
    /// Branches that received a new commit.
    pub commits: usize,
    pub gaps: Vec<Gap>,
}

impl BackupReport {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} projects, {} resources written, {} branches committed, {} gaps",
            self.projects.len(),
            self.written,
            self.commits,
            self.gaps.len()
        )
    }
}

/// Outcome of one restore.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub source: String,
    pub target: String,
    pub created: usize,
    pub failures: Vec<Gap>,
}

impl RestoreReport {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} -> {}: {} resources created, {} failed",
            self.source,
            self.target,
            self.created,
            self.failures.len()
        )
    }
}
