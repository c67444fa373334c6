//! In-memory parameter store

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::traits::{
    offset_page, BackendError, BackendResult, Page, PageRequest, SecretBackend, ValueRequest,
};
use crate::types::SecretRecord;

#[derive(Debug, Clone)]
struct Parameter {
    value: String,
    secure: bool,
}

/// In-memory backend with parameter-store semantics
///
/// Paths are `/`-separated. Secure values are only returned when decryption
/// is requested, and page requests larger than `PAGE_CAP` are rejected.
/// Listing order is lexicographic; continuation tokens are offsets into the
/// listing as it looks when each page is requested, so concurrent writes can
/// make consecutive pages overlap.
///
/// # Thread Safety
///
/// The store uses `RwLock` internally and is safe to use from multiple threads.
///
/// # Example
///
/// ```
/// use credresolve_core::backend::{MemoryBackend, SecretBackend, ValueRequest};
///
/// let backend = MemoryBackend::new();
/// backend.put_secure("/concourse/alpha/cheery", "hunter2");
///
/// let value = backend.fetch_value(&ValueRequest::decrypted("/concourse/alpha/cheery")).unwrap();
/// assert_eq!(value, "hunter2");
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    parameters: RwLock<BTreeMap<String, Parameter>>,
}

impl MemoryBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding plain values
    pub fn with_records(records: impl IntoIterator<Item = SecretRecord>) -> Self {
        let backend = Self::new();
        for record in records {
            backend.put(&record.path, &record.value);
        }
        backend
    }

    /// Store a plain value
    pub fn put(&self, path: &str, value: &str) {
        self.insert(path, value, false);
    }

    /// Store a value that is only readable with decryption requested
    pub fn put_secure(&self, path: &str, value: &str) {
        self.insert(path, value, true);
    }

    /// Remove a value, returning whether it existed
    pub fn remove(&self, path: &str) -> bool {
        self.parameters.write().remove(path).is_some()
    }

    /// Swap the whole contents for plain `values` under a single write lock
    pub fn replace_all(&self, values: impl IntoIterator<Item = (String, String)>) {
        let fresh: BTreeMap<String, Parameter> = values
            .into_iter()
            .map(|(path, value)| (path, Parameter { value, secure: false }))
            .collect();
        *self.parameters.write() = fresh;
    }

    /// Remove every value
    pub fn clear(&self) {
        self.parameters.write().clear();
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.parameters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, path: &str, value: &str, secure: bool) {
        self.parameters.write().insert(
            path.to_string(),
            Parameter {
                value: value.to_string(),
                secure,
            },
        );
    }
}

fn is_under(path: &str, prefix: &str, recursive: bool) -> bool {
    let base = prefix.trim_end_matches('/');
    let rest = match path.strip_prefix(base).and_then(|r| r.strip_prefix('/')) {
        Some(rest) if !rest.is_empty() => rest,
        _ => return false,
    };
    recursive || !rest.contains('/')
}

impl SecretBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String> {
        let parameters = self.parameters.read();
        let parameter = parameters
            .get(&request.path)
            .ok_or_else(|| BackendError::NotFound(request.path.clone()))?;
        if parameter.secure && !request.with_decryption {
            return Err(BackendError::InvalidRequest(format!(
                "{} is a secure value and decryption was not requested",
                request.path
            )));
        }
        Ok(parameter.value.clone())
    }

    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page> {
        let parameters = self.parameters.read();
        let listing = parameters
            .keys()
            .filter(|path| is_under(path, &request.prefix, request.recursive))
            .cloned();
        offset_page(listing, request)
    }
}

impl Clone for MemoryBackend {
    fn clone(&self) -> Self {
        Self {
            parameters: RwLock::new(self.parameters.read().clone()),
        }
    }
}
