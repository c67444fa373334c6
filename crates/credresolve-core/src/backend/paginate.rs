//! Pull-style pagination over a backend's page sequence

use std::collections::HashSet;
use std::iter::FusedIterator;

use indexmap::IndexSet;
use tracing::trace;

use super::traits::{BackendError, BackendResult, PageRequest, SecretBackend};

/// Lazy, single-pass sequence of enumeration batches
///
/// Each call to `next` issues exactly one `fetch_page` round trip, threading
/// the continuation token from the previous page. The sequence ends after
/// the page that carries no token, right after the first error, or when the
/// backend hands back a token it already issued. It cannot be resumed: a
/// retry starts a new enumerator from the root.
///
/// # Example
///
/// ```
/// use credresolve_core::backend::{MemoryBackend, SecretBackend};
///
/// let backend = MemoryBackend::new();
/// backend.put("/concourse/alpha/bogus/cheery", "value");
///
/// let mut pages = backend.enumerate_under("/concourse/alpha");
/// let names = pages.drain_unique().unwrap();
/// assert_eq!(names.len(), 1);
/// ```
pub struct PaginatedEnumerator<'a, B: SecretBackend + ?Sized> {
    backend: &'a B,
    request: PageRequest,
    tokens_seen: HashSet<String>,
    finished: bool,
    pages_read: usize,
}

impl<'a, B: SecretBackend + ?Sized> PaginatedEnumerator<'a, B> {
    /// Start a recursive, names-only enumeration under `prefix`
    pub fn new(backend: &'a B, prefix: &str) -> Self {
        Self {
            backend,
            request: PageRequest::names_under(prefix),
            tokens_seen: HashSet::new(),
            finished: false,
            pages_read: 0,
        }
    }

    /// Number of pages successfully fetched so far
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// Whether the final page has been seen or an error ended the sequence
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain every remaining page into an order-preserving set of paths
    ///
    /// Pages may overlap when the store changes between round trips, so a
    /// repeated path keeps its first position. Nothing is returned on error.
    pub fn drain_unique(&mut self) -> BackendResult<IndexSet<String>> {
        let mut seen = IndexSet::new();
        for batch in self.by_ref() {
            seen.extend(batch?);
        }
        Ok(seen)
    }
}

impl<'a, B: SecretBackend + ?Sized> Iterator for PaginatedEnumerator<'a, B> {
    type Item = BackendResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let page = match self.backend.fetch_page(&self.request) {
            Ok(page) => page,
            Err(err) => {
                self.finished = true;
                return Some(Err(err));
            }
        };
        self.pages_read += 1;
        trace!(
            prefix = %self.request.prefix,
            page = self.pages_read,
            entries = page.entries.len(),
            "fetched enumeration page"
        );

        match page.next_token {
            None => self.finished = true,
            Some(token) => {
                if !self.tokens_seen.insert(token.clone()) {
                    self.finished = true;
                    return Some(Err(BackendError::InvalidRequest(format!(
                        "pagination token '{}' repeated for {}",
                        token, self.request.prefix
                    ))));
                }
                self.request.next_token = Some(token);
            }
        }

        Some(Ok(page.entries))
    }
}

impl<'a, B: SecretBackend + ?Sized> FusedIterator for PaginatedEnumerator<'a, B> {}
