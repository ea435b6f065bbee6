use anyhow::{Result, bail};

/// Validate a project name before it is used as a git branch.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("project name must not be empty");
    }
    if name.len() > 63 {
        bail!("project name '{}' exceeds 63 characters (got {})", name, name.len());
    }
    if name.starts_with('-') || name.ends_with('-') {
        bail!("project name '{}' must not start or end with a hyphen", name);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "project name '{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            name
        );
    }
    Ok(())
}

/// Validate a resource name before it becomes a file name.
/// It must be a single path segment: no separators, not `.` or `..`, max 253 chars.
pub fn validate_resource_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("resource name must not be empty");
    }
    if name.len() > 253 {
        bail!("resource name '{}' exceeds 253 characters (got {})", name, name.len());
    }
    if name == "." || name == ".." {
        bail!("resource name '{}' is not a valid file name", name);
    }
    if name.contains(['/', '\\', '\0']) {
        bail!("resource name '{}' must not contain path separators", name);
    }
    Ok(())
}
