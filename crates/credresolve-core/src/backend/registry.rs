//! Backend registry for creating backends by name

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::env_backend::EnvBackend;
use super::file_backend::FileBackend;
use super::memory_backend::MemoryBackend;
use super::traits::SecretBackend;
use crate::config::{ConfigError, ConfigResult};

/// Options passed to a backend factory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOptions {
    /// Store file, for file-based backends
    pub file: Option<PathBuf>,
}

/// Factory function type for creating backends
pub type BackendFactory =
    Box<dyn Fn(&BackendOptions) -> ConfigResult<Arc<dyn SecretBackend>> + Send + Sync>;

/// Definition of a registered backend
pub struct BackendDefinition {
    /// Unique name for this backend
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: BackendFactory,
}

impl std::fmt::Debug for BackendDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn builtin(name: &str, description: &str, factory: BackendFactory) -> (String, BackendDefinition) {
    (
        name.to_string(),
        BackendDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    )
}

/// Global registry of backends
static REGISTRY: Lazy<RwLock<HashMap<String, BackendDefinition>>> = Lazy::new(|| {
    let map = HashMap::from([
        builtin(
            "memory",
            "In-memory parameter store, empty on creation",
            Box::new(|_| Ok(Arc::new(MemoryBackend::new()))),
        ),
        builtin(
            "env",
            "Read secrets from environment variables",
            Box::new(|_| Ok(Arc::new(EnvBackend::new()))),
        ),
        builtin(
            "file",
            "Read secrets from a YAML file of path/value pairs",
            Box::new(|options| {
                let path = options.file.clone().ok_or_else(|| {
                    ConfigError::Invalid("the file backend needs a store file".to_string())
                })?;
                Ok(Arc::new(FileBackend::open(path)?))
            }),
        ),
    ]);
    RwLock::new(map)
});

/// Register a backend type, replacing any existing registration with the same name
///
/// # Example
///
/// ```
/// use credresolve_core::backend::{
///     create_backend, register_backend, BackendOptions, MemoryBackend, SecretBackend,
/// };
/// use std::sync::Arc;
///
/// register_backend(
///     "seeded",
///     "Memory store with a fixed value",
///     Box::new(|_| {
///         let backend = MemoryBackend::new();
///         backend.put("/concourse/main/token", "abc");
///         Ok(Arc::new(backend))
///     }),
/// );
///
/// let backend = create_backend("seeded", &BackendOptions::default()).unwrap();
/// assert_eq!(backend.name(), "memory");
/// ```
pub fn register_backend(name: &str, description: &str, factory: BackendFactory) {
    let (key, definition) = builtin(name, description, factory);
    REGISTRY.write().insert(key, definition);
}

/// Create a backend by name
pub fn create_backend(name: &str, options: &BackendOptions) -> ConfigResult<Arc<dyn SecretBackend>> {
    let registry = REGISTRY.read();
    let definition = registry
        .get(name)
        .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))?;
    (definition.factory)(options)
}

/// List registered backends as (name, description) pairs, sorted by name
pub fn list_backends() -> Vec<(String, String)> {
    let mut backends: Vec<_> = REGISTRY
        .read()
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    backends.sort();
    backends
}

/// Check if a backend is registered
pub fn has_backend(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Unregister a backend (mainly for testing)
pub fn unregister_backend(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}
