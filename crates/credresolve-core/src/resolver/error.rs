//! Resolution error types

use thiserror::Error;

use crate::backend::BackendError;
use crate::template::TemplateError;

/// Errors that can occur while resolving or listing variables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A template could not be rendered; never retried
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The last lookup attempted failed; displays as the backend's own message
    #[error("{source}")]
    Lookup {
        path: String,
        #[source]
        source: BackendError,
    },

    /// An enumeration page failed; no partial listing is returned
    #[error("Failed to list secrets under {prefix} after {pages_read} page(s): {source}")]
    Aggregation {
        prefix: String,
        pages_read: usize,
        #[source]
        source: BackendError,
    },
}

impl ResolveError {
    /// The backend error behind this failure, exactly as the backend reported it
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            ResolveError::Lookup { source, .. } | ResolveError::Aggregation { source, .. } => {
                Some(source)
            }
            ResolveError::Template(_) => None,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
