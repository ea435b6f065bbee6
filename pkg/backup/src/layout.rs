//! On-disk layout of a project branch.
//!
//! ```text
//! <working_dir>/
//!   ConfigMap/
//!     app-config.yaml
//!   Route/
//!     web.yaml
//! ```
//!
//! One YAML document per resource, one directory per kind, named exactly after the kind.

use pkg_constants::paths::RESOURCE_FILE_EXT;
use pkg_types::validate::validate_resource_name;
use pkg_types::{ResourceDocument, ResourceKind};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{0}")]
    InvalidName(String),

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LayoutError + '_ {
    move |source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn kind_dir(dir: &Path, kind: &ResourceKind) -> PathBuf {
    dir.join(kind.name())
}

pub fn resource_path(dir: &Path, kind: &ResourceKind, name: &str) -> PathBuf {
    kind_dir(dir, kind).join(format!("{}.{}", name, RESOURCE_FILE_EXT))
}

/// Write `document` to `<dir>/<kind>/<name>.yaml`, creating the kind directory if needed.
pub fn write(
    document: &ResourceDocument,
    dir: &Path,
    kind: &ResourceKind,
    name: &str,
) -> Result<PathBuf, LayoutError> {
    validate_resource_name(name).map_err(|e| LayoutError::InvalidName(e.to_string()))?;

    let kind_dir = kind_dir(dir, kind);
    fs::create_dir_all(&kind_dir).map_err(io_error(&kind_dir))?;

    let path = resource_path(dir, kind, name);
    let yaml = document.to_yaml().map_err(|source| LayoutError::Encode {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, yaml).map_err(io_error(&path))?;
    Ok(path)
}

/// Remove the previous dump of `kind`. A missing directory is not an error.
pub fn clear_kind(dir: &Path, kind: &ResourceKind) -> Result<(), LayoutError> {
    let kind_dir = kind_dir(dir, kind);
    match fs::remove_dir_all(&kind_dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(&kind_dir)(e)),
    }
}

/// Every document stored under `<dir>/<kind>/`.
///
/// Nothing is read until the returned value is iterated, and it can be iterated
/// any number of times; each pass re-reads the directory.
pub fn read_all(dir: &Path, kind: &ResourceKind) -> KindDocuments {
    KindDocuments {
        dir: kind_dir(dir, kind),
    }
}

/// A document together with the file it was read from.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub path: PathBuf,
    pub document: ResourceDocument,
}

impl StoredDocument {
    /// Resource name derived from the file name.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct KindDocuments {
    dir: PathBuf,
}

impl KindDocuments {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn iter(&self) -> DocumentIter {
        match fs::read_dir(&self.dir) {
            Ok(entries) => DocumentIter {
                dir: self.dir.clone(),
                entries: Some(entries),
                pending: None,
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DocumentIter {
                dir: self.dir.clone(),
                entries: None,
                pending: None,
            },
            Err(e) => DocumentIter {
                dir: self.dir.clone(),
                entries: None,
                pending: Some(io_error(&self.dir)(e)),
            },
        }
    }
}

impl<'a> IntoIterator for &'a KindDocuments {
    type Item = Result<StoredDocument, LayoutError>;
    type IntoIter = DocumentIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct DocumentIter {
    dir: PathBuf,
    entries: Option<fs::ReadDir>,
    pending: Option<LayoutError>,
}

impl Iterator for DocumentIter {
    type Item = Result<StoredDocument, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        let entries = self.entries.as_mut()?;
        loop {
            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(io_error(&self.dir)(e))),
            };
            let path = entry.path();
            if !path.is_file() || path.extension() != Some(OsStr::new(RESOURCE_FILE_EXT)) {
                continue;
            }
            return Some(read_document(path));
        }
    }
}

fn read_document(path: PathBuf) -> Result<StoredDocument, LayoutError> {
    let content = fs::read_to_string(&path).map_err(io_error(&path))?;
    let document = ResourceDocument::from_yaml(&content).map_err(|source| LayoutError::Decode {
        path: path.clone(),
        source,
    })?;
    Ok(StoredDocument { path, document })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn config_map(name: &str) -> ResourceDocument {
        ResourceDocument::new(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": name, "namespace": "shop" },
            "data": { "key": "value" }
        }))
    }

    fn cm() -> ResourceKind {
        "ConfigMap".parse().unwrap()
    }

    #[test]
    fn write_creates_kind_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&config_map("app"), dir.path(), &cm(), "app").unwrap();
        assert_eq!(path, dir.path().join("ConfigMap/app.yaml"));

        // A second write into the existing directory is fine.
        write(&config_map("db"), dir.path(), &cm(), "db").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("name: app"));
    }

    #[test]
    fn write_rejects_path_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let err = write(&config_map("x"), dir.path(), &cm(), "../x").unwrap_err();
        assert!(matches!(err, LayoutError::InvalidName(_)));
        assert!(!dir.path().join("x.yaml").exists());
    }

    #[test]
    fn read_all_returns_every_yaml_file_and_restarts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app", "db", "cache"] {
            write(&config_map(name), dir.path(), &cm(), name).unwrap();
        }
        fs::write(dir.path().join("ConfigMap/README.md"), "not a resource").unwrap();
        fs::create_dir_all(dir.path().join("ConfigMap/nested")).unwrap();

        let docs = read_all(dir.path(), &cm());
        let first: BTreeSet<_> = docs
            .iter()
            .map(|d| d.unwrap().document.name().unwrap().to_string())
            .collect();
        let second: BTreeSet<_> = (&docs).into_iter().map(|d| d.unwrap().file_stem()).collect();

        let expected: BTreeSet<_> = ["app", "cache", "db"].iter().map(|s| s.to_string()).collect();
        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[test]
    fn read_all_round_trips_documents() {
        let dir = tempfile::tempdir().unwrap();
        let original = config_map("app");
        write(&original, dir.path(), &cm(), "app").unwrap();

        let read: Vec<_> = read_all(dir.path(), &cm()).iter().collect();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].as_ref().unwrap().document, original);
    }

    #[test]
    fn read_all_of_missing_kind_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_all(dir.path(), &cm()).iter().count(), 0);
    }

    #[test]
    fn read_all_reports_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ConfigMap")).unwrap();
        fs::write(dir.path().join("ConfigMap/broken.yaml"), "key: [unclosed").unwrap();

        let results: Vec<_> = read_all(dir.path(), &cm()).iter().collect();
        assert!(matches!(results[0], Err(LayoutError::Decode { .. })));
    }

    #[test]
    fn clear_kind_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write(&config_map("app"), dir.path(), &cm(), "app").unwrap();
        clear_kind(dir.path(), &cm()).unwrap();
        assert!(!dir.path().join("ConfigMap").exists());
        clear_kind(dir.path(), &cm()).unwrap();
    }
}
