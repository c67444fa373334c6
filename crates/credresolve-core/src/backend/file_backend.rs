//! YAML file backend

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::memory_backend::MemoryBackend;
use super::traits::{BackendResult, Page, PageRequest, SecretBackend, ValueRequest};
use crate::config::ConfigResult;

/// Backend serving values from a YAML mapping of path to value
///
/// ```yaml
/// /concourse/alpha/bogus/cheery: pipeline value
/// /concourse/alpha/cheery: team value
/// ```
///
/// The file is read when the backend is opened and again on [`FileBackend::reload`].
pub struct FileBackend {
    path: PathBuf,
    inner: MemoryBackend,
}

impl FileBackend {
    /// Open and read a store file
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let backend = Self {
            path: path.into(),
            inner: MemoryBackend::new(),
        };
        backend.reload()?;
        Ok(backend)
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the store file, replacing every value
    pub fn reload(&self) -> ConfigResult<()> {
        let content = fs::read_to_string(&self.path)?;
        let values: BTreeMap<String, String> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(&content)?
        };

        let count = values.len();
        self.inner.replace_all(values);
        debug!(path = %self.path.display(), count, "loaded secret store file");
        Ok(())
    }
}

impl SecretBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String> {
        self.inner.fetch_value(request)
    }

    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page> {
        self.inner.fetch_page(request)
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("path", &self.path)
            .field("values", &format!("[{} values]", self.inner.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::config::ConfigError;

    fn write_store(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_file_backend_reads_values() {
        let (_dir, path) = write_store("/concourse/alpha/cheery: team value\n/concourse/alpha/bogus/cheery: pipeline value\n");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.name(), "file");
        assert_eq!(backend.path(), path.as_path());
        assert_eq!(
            backend.fetch_value(&ValueRequest::decrypted("/concourse/alpha/cheery")),
            Ok("team value".to_string())
        );

        let names = backend.enumerate_under("/concourse/alpha/bogus").drain_unique().unwrap();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_file_backend_reload() {
        let (_dir, path) = write_store("/a: one\n");
        let backend = FileBackend::open(&path).unwrap();

        fs::write(&path, "/b: two\n").unwrap();
        backend.reload().unwrap();

        assert_eq!(
            backend.fetch_value(&ValueRequest::decrypted("/a")),
            Err(BackendError::NotFound("/a".to_string()))
        );
        assert_eq!(backend.fetch_value(&ValueRequest::decrypted("/b")), Ok("two".to_string()));
    }

    #[test]
    fn test_file_backend_empty_file() {
        let (_dir, path) = write_store("");
        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.fetch_value(&ValueRequest::decrypted("/a")).is_err());
    }

    #[test]
    fn test_file_backend_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(FileBackend::open(dir.path().join("absent.yaml")), Err(ConfigError::Io(_))));

        let (_dir, path) = write_store("- not\n- a\n- mapping\n");
        assert!(matches!(FileBackend::open(&path), Err(ConfigError::Yaml(_))));
    }
}
