//! Credresolve Core
//!
//! Resolves pipeline variables to secret values stored in a hierarchical
//! parameter store. Each variable is looked up at a pipeline-scoped path
//! first and, when configured, at a team-scoped fallback path.
//!
//! ## Resolution
//!
//! Paths are rendered from templates over the team, pipeline and variable name:
//! - `/concourse/{{.Team}}/{{.Pipeline}}/{{.Secret}}` (primary)
//! - `/concourse/{{.Team}}/{{.Secret}}` (fallback)
//!
//! ```rust
//! use credresolve_core::backend::MemoryBackend;
//! use credresolve_core::resolver::ResolverFactory;
//! use credresolve_core::template::{PathTemplate, DEFAULT_FALLBACK_TEMPLATE, DEFAULT_SECRET_TEMPLATE};
//! use credresolve_core::types::VariableDefinition;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! backend.put("/concourse/main/token", "team-wide");
//!
//! let factory = ResolverFactory::new(
//!     backend,
//!     PathTemplate::parse(DEFAULT_SECRET_TEMPLATE).unwrap(),
//!     Some(PathTemplate::parse(DEFAULT_FALLBACK_TEMPLATE).unwrap()),
//! ).unwrap();
//!
//! let resolver = factory.for_pipeline("main", "deploy");
//! let secret = resolver.get(&VariableDefinition::new("token").unwrap()).unwrap();
//! assert_eq!(secret.value, "team-wide");
//! assert_eq!(secret.path, "/concourse/main/token");
//! ```

pub mod types;
pub mod template;
pub mod backend;
pub mod resolver;
pub mod interpolate;
pub mod config;

// Re-export commonly used types
pub use types::{ResolvedSecret, TemplateContext, Tier, VariableDefinition};

pub use template::{PathTemplate, TemplateError};

pub use backend::{
    BackendError, EnvBackend, FileBackend, MemoryBackend, PaginatedEnumerator, SecretBackend,
    create_backend, list_backends, register_backend,
};

pub use resolver::{CredentialResolver, ResolveError, ResolverConfig, ResolverFactory};

pub use interpolate::{interpolate, placeholders, InterpolateError};

pub use config::{ConfigError, Settings};
