//! Secret backend abstractions and implementations
//!
//! This module provides the boundary to external secret stores:
//! - `SecretBackend` trait with point lookups and paged enumeration
//! - `PaginatedEnumerator`, a pull-style iterator over enumeration pages
//! - Built-in backends: `MemoryBackend`, `EnvBackend`, `FileBackend`, `MockBackend`
//! - A registry for creating backends by name

mod traits;
mod paginate;
mod memory_backend;
mod env_backend;
mod file_backend;
mod registry;
pub mod mock;

pub use traits::{
    BackendError, BackendResult, Page, PageRequest, SecretBackend, ValueRequest, PAGE_CAP,
};
pub use paginate::PaginatedEnumerator;
pub use memory_backend::MemoryBackend;
pub use env_backend::EnvBackend;
pub use file_backend::FileBackend;
pub use mock::{MockBackend, MockPage};
pub use registry::{
    create_backend, has_backend, list_backends, register_backend, unregister_backend,
    BackendDefinition, BackendFactory, BackendOptions,
};
