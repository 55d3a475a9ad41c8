//! Paginated entity sources
//!
//! An [`EntitySource`] is the only I/O boundary of the search core: given a
//! lowered filter and a page number it returns one page of raw records.
//! Production callers implement it over the console's REST client.
//!
//! [`MemorySource`] answers requests from an in-memory record list by
//! evaluating the filter locally, with injectable delays and failures.

use async_trait::async_trait;
use nimbus_core::{FetchError, Page, PageRequest};
use nimbus_query::matches;
use parking_lot::Mutex;
use serde_json::Value;
use std::time::Duration;

/// Paginated list capability of one entity
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch one page of records matching `request.filter`
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError>;
}

#[derive(Debug, Clone)]
struct Failure {
    error: FetchError,
    /// `None` fails every page
    page: Option<u32>,
}

/// In-memory [`EntitySource`]
///
/// Pages are cut from the matching records in insertion order. Every
/// request is recorded and can be inspected with [`MemorySource::requests`].
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Mutex<Vec<Value>>,
    delay: Duration,
    slow_filters: Vec<(String, Duration)>,
    failure: Mutex<Option<Failure>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MemorySource {
    /// Create a source over `records`
    pub fn new(records: Vec<Value>) -> Self {
        MemorySource {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Create a source with no records
    pub fn empty() -> Self {
        MemorySource::default()
    }

    /// Create a source whose every request fails with `error`
    pub fn failing(error: FetchError) -> Self {
        let source = MemorySource::default();
        source.fail_with(error);
        source
    }

    /// Delay every response by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay responses whose filter text contains `needle`
    ///
    /// Overrides [`MemorySource::with_delay`] for matching requests. The
    /// first registered needle that matches wins.
    pub fn with_delay_for(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.slow_filters.push((needle.into(), delay));
        self
    }

    /// Fail every subsequent request with `error`
    pub fn fail_with(&self, error: FetchError) {
        *self.failure.lock() = Some(Failure { error, page: None });
    }

    /// Fail requests for `page` with `error`
    pub fn fail_on_page(&self, page: u32, error: FetchError) {
        *self.failure.lock() = Some(Failure {
            error,
            page: Some(page),
        });
    }

    /// Remove any injected failure
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Append a record
    pub fn push(&self, record: Value) {
        self.records.lock().push(record);
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn delay_for(&self, request: &PageRequest) -> Duration {
        let key = request.filter.cache_key();
        self.slow_filters
            .iter()
            .find(|(needle, _)| key.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
            .unwrap_or(self.delay)
    }

    fn answer(&self, request: &PageRequest) -> Result<Page, FetchError> {
        if let Some(failure) = self.failure.lock().as_ref() {
            if failure.page.map_or(true, |page| page == request.page) {
                return Err(failure.error.clone());
            }
        }

        let matching: Vec<Value> = self
            .records
            .lock()
            .iter()
            .filter(|record| matches(&request.filter, record))
            .cloned()
            .collect();

        let page_size = request.page_size.max(1) as usize;
        let total = matching.len();
        let pages = ((total + page_size - 1) / page_size).max(1) as u32;
        let start = (request.page.saturating_sub(1) as usize).saturating_mul(page_size);
        let data = matching
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect();

        Ok(Page::new(data, request.page, pages, total as u32))
    }
}

#[async_trait]
impl EntitySource for MemorySource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        self.requests.lock().push(request.clone());

        let delay = self.delay_for(request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.answer(request)
    }
}
