//! Mock backend for testing
//!
//! Returns scripted values and pages and records every request it receives,
//! so tests can check the flags the resolver sends.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::traits::{BackendError, BackendResult, Page, PageRequest, SecretBackend, ValueRequest};

/// One scripted enumeration page
#[derive(Debug, Clone)]
pub struct MockPage {
    result: BackendResult<Vec<String>>,
}

impl MockPage {
    pub fn ok(entries: &[&str]) -> Self {
        Self {
            result: Ok(entries.iter().map(|e| e.to_string()).collect()),
        }
    }

    pub fn err(error: BackendError) -> Self {
        Self { result: Err(error) }
    }
}

/// Scripted backend that records requests
///
/// Paths without a scripted value fail with `missing_error`, which defaults
/// to `BackendError::NotFound(path)`. Page `n` is served for continuation
/// token `n`; the first request carries no token.
#[derive(Debug, Default)]
pub struct MockBackend {
    values: HashMap<String, BackendResult<String>>,
    missing_error: Option<BackendError>,
    pages: Vec<MockPage>,
    value_requests: Mutex<Vec<ValueRequest>>,
    page_requests: Mutex<Vec<PageRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` for `path`
    pub fn with_value(mut self, path: &str, value: &str) -> Self {
        self.values.insert(path.to_string(), Ok(value.to_string()));
        self
    }

    /// Fail lookups of `path` with `error`
    pub fn with_error(mut self, path: &str, error: BackendError) -> Self {
        self.values.insert(path.to_string(), Err(error));
        self
    }

    /// Fail every unscripted lookup with `error`
    pub fn with_missing_error(mut self, error: BackendError) -> Self {
        self.missing_error = Some(error);
        self
    }

    /// Script the enumeration pages, in delivery order
    pub fn with_pages(mut self, pages: Vec<MockPage>) -> Self {
        self.pages = pages;
        self
    }

    /// Every point lookup received so far
    pub fn value_requests(&self) -> Vec<ValueRequest> {
        self.value_requests.lock().clone()
    }

    /// Paths looked up so far, in order
    pub fn requested_paths(&self) -> Vec<String> {
        self.value_requests.lock().iter().map(|r| r.path.clone()).collect()
    }

    /// Every page request received so far
    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().clone()
    }
}

impl SecretBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String> {
        self.value_requests.lock().push(request.clone());
        match self.values.get(&request.path) {
            Some(result) => result.clone(),
            None => Err(self
                .missing_error
                .clone()
                .unwrap_or_else(|| BackendError::NotFound(request.path.clone()))),
        }
    }

    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page> {
        self.page_requests.lock().push(request.clone());
        if self.pages.is_empty() {
            return Err(BackendError::Other("no pages are scripted".to_string()));
        }

        let index = match &request.next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| BackendError::InvalidRequest(format!("bad token '{}'", token)))?,
        };
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| BackendError::InvalidRequest(format!("no page {}", index)))?;

        let entries = page.result.clone()?;
        if index + 1 < self.pages.len() {
            Ok(Page::with_next(entries, (index + 1).to_string()))
        } else {
            Ok(Page::last(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_value_requests() {
        let backend = MockBackend::new().with_value("/a", "1");

        assert_eq!(backend.fetch_value(&ValueRequest::decrypted("/a")), Ok("1".to_string()));
        assert_eq!(
            backend.fetch_value(&ValueRequest::decrypted("/b")),
            Err(BackendError::NotFound("/b".to_string()))
        );
        assert_eq!(backend.requested_paths(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_mock_without_pages_fails() {
        let backend = MockBackend::new();
        assert!(backend.fetch_page(&PageRequest::names_under("/")).is_err());
    }
}
