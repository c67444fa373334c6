//! Core traits and types for secret backends

use std::sync::Arc;

use thiserror::Error;

use super::paginate::PaginatedEnumerator;

/// Maximum number of entries requested per enumeration round trip
pub const PAGE_CAP: usize = 10;

/// Errors reported by a backend
///
/// The resolver never branches on the variant: a missing secret and an
/// unreachable store are handled the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Parameter not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Backend error: {0}")]
    Other(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A point lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRequest {
    pub path: String,
    /// Ask the store to decrypt protected values
    pub with_decryption: bool,
}

impl ValueRequest {
    /// A lookup that asks for the decrypted value
    pub fn decrypted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            with_decryption: true,
        }
    }
}

/// One enumeration round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub prefix: String,
    pub recursive: bool,
    pub with_decryption: bool,
    pub max_results: usize,
    /// Continuation token from the previous page, `None` for the first page
    pub next_token: Option<String>,
}

impl PageRequest {
    /// First page of a recursive, names-only listing under `prefix`
    pub fn names_under(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            recursive: true,
            with_decryption: false,
            max_results: PAGE_CAP,
            next_token: None,
        }
    }
}

/// One page of enumeration results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Fully-qualified paths
    pub entries: Vec<String>,
    /// Token for the next page; `None` marks the final page
    pub next_token: Option<String>,
}

impl Page {
    pub fn last(entries: Vec<String>) -> Self {
        Self {
            entries,
            next_token: None,
        }
    }

    pub fn with_next(entries: Vec<String>, next_token: impl Into<String>) -> Self {
        Self {
            entries,
            next_token: Some(next_token.into()),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

/// Serve one page of an ordered listing using offset continuation tokens
///
/// Shared by the reference backends. Rejects page sizes outside
/// `1..=PAGE_CAP` and tokens that are not offsets.
pub(crate) fn offset_page<I>(listing: I, request: &PageRequest) -> BackendResult<Page>
where
    I: Iterator<Item = String>,
{
    if request.max_results == 0 || request.max_results > PAGE_CAP {
        return Err(BackendError::InvalidRequest(format!(
            "max_results must be between 1 and {}, got {}",
            PAGE_CAP, request.max_results
        )));
    }
    let offset = match &request.next_token {
        None => 0,
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| BackendError::InvalidRequest(format!("invalid next token '{}'", token)))?,
    };

    let mut remaining = listing.skip(offset);
    let entries: Vec<String> = remaining.by_ref().take(request.max_results).collect();
    if remaining.next().is_some() {
        Ok(Page::with_next(entries, (offset + request.max_results).to_string()))
    } else {
        Ok(Page::last(entries))
    }
}

/// Capability boundary to an external secret store
///
/// Implementations:
/// - `MemoryBackend`: in-memory parameter store for testing and embedding
/// - `EnvBackend`: read-only view of the process environment
/// - `FileBackend`: YAML file of path/value pairs
/// - `MockBackend`: scripted responses that record every request
///
/// Retries, timeouts and reconnection belong to the implementation.
pub trait SecretBackend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Look up a single value
    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String>;

    /// Fetch one page of paths under `request.prefix`
    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page>;

    /// Lazily enumerate every path under `prefix`, one page per round trip
    fn enumerate_under(&self, prefix: &str) -> PaginatedEnumerator<'_, Self>
    where
        Self: Sized,
    {
        PaginatedEnumerator::new(self, prefix)
    }
}

impl<T> SecretBackend for Arc<T>
where
    T: SecretBackend + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String> {
        (**self).fetch_value(request)
    }

    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page> {
        (**self).fetch_page(request)
    }
}

impl<T> SecretBackend for Box<T>
where
    T: SecretBackend + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String> {
        (**self).fetch_value(request)
    }

    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page> {
        (**self).fetch_page(request)
    }
}
