//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern observed across the
//! supported providers.

use super::types::{extract_path, PageCursor, PageRequest, PageResponse, Paginator};

// ============================================================================
// Single Page
// ============================================================================

/// No pagination - a single request returns everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePagePaginator;

impl Paginator for SinglePagePaginator {
    fn initial(&self, window_start: Option<String>) -> PageCursor {
        PageCursor::new(0, window_start)
    }

    fn request(&self, _cursor: &PageCursor) -> PageRequest {
        PageRequest::new()
    }

    fn next(&self, _cursor: &PageCursor, _response: &PageResponse) -> Option<PageCursor> {
        None
    }
}

// ============================================================================
// Short Page
// ============================================================================

/// Page-number pagination where a short page signals the end.
///
/// The provider is asked for fixed-size pages; a response with fewer records
/// than the requested page size is the last one. The time-window filter stays
/// fixed while the page counter advances.
///
/// Providers that cap total retrievable records per window (page-depth
/// ceiling) get re-windowed scans: on hitting the ceiling the window start
/// rolls forward to the creation timestamp of the last record seen and the
/// page counter resets, so page depth stays bounded.
#[derive(Debug, Clone)]
pub struct ShortPagePaginator {
    /// Query parameter name for the page counter
    pub page_param: String,
    /// First page number (0 or 1 depending on provider)
    pub start_page: u32,
    /// Query parameter name for the page size
    pub per_page_param: String,
    /// Requested page size
    pub per_page: u32,
    /// Query parameter name for the window start filter
    pub window_param: Option<String>,
    /// Record field holding the creation timestamp used for re-windowing
    pub creation_field: Option<String>,
    /// Provider cap on records retrievable within one window
    pub max_records: Option<u64>,
}

impl ShortPagePaginator {
    /// Create a new short-page paginator
    pub fn new(
        page_param: impl Into<String>,
        start_page: u32,
        per_page_param: impl Into<String>,
        per_page: u32,
    ) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            per_page_param: per_page_param.into(),
            per_page,
            window_param: None,
            creation_field: None,
            max_records: None,
        }
    }

    /// Set the window filter parameter
    #[must_use]
    pub fn with_window(mut self, param: impl Into<String>) -> Self {
        self.window_param = Some(param.into());
        self
    }

    /// Set the page-depth ceiling and the field used to re-window past it
    #[must_use]
    pub fn with_depth_ceiling(mut self, max_records: u64, creation_field: impl Into<String>) -> Self {
        self.max_records = Some(max_records);
        self.creation_field = Some(creation_field.into());
        self
    }

    /// Records already requested in this window, counting the current page
    fn records_scanned(&self, cursor: &PageCursor) -> u64 {
        let pages = u64::from(cursor.page.saturating_sub(self.start_page)) + 1;
        pages * u64::from(self.per_page)
    }
}

impl Paginator for ShortPagePaginator {
    fn initial(&self, window_start: Option<String>) -> PageCursor {
        PageCursor::new(self.start_page, window_start)
    }

    fn request(&self, cursor: &PageCursor) -> PageRequest {
        let mut request = PageRequest::new()
            .with(&self.per_page_param, self.per_page.to_string())
            .with(&self.page_param, cursor.page.to_string());

        if let (Some(param), Some(start)) = (&self.window_param, &cursor.window_start) {
            request = request.with(param, start);
        }

        request
    }

    fn next(&self, cursor: &PageCursor, response: &PageResponse) -> Option<PageCursor> {
        if response.len() < self.per_page as usize {
            return None;
        }

        if let (Some(max), Some(field)) = (self.max_records, &self.creation_field) {
            if self.records_scanned(cursor) >= max {
                // Ceiling reached: roll the window forward to the newest
                // record seen and restart the page counter.
                let window = response.last_record_value(field)?;
                return Some(PageCursor::new(self.start_page, Some(window)));
            }
        }

        Some(PageCursor::new(
            cursor.page + 1,
            cursor.window_start.clone(),
        ))
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Pagination driven by an explicit page-counter envelope in the response.
///
/// The payload carries `{page, lastPage, nextPage}` counters; pagination ends
/// when `page == lastPage`, otherwise the next request asks for `nextPage`.
#[derive(Debug, Clone)]
pub struct EnvelopePaginator {
    /// Query parameter name for the page counter
    pub page_param: String,
    /// First page number
    pub start_page: u32,
    /// Optional page size parameter name
    pub per_page_param: Option<String>,
    /// Page size value
    pub per_page: Option<u32>,
    /// Query parameter name for the window start filter
    pub window_param: Option<String>,
    /// Path to the current page counter in the payload
    pub page_path: String,
    /// Path to the last page counter in the payload
    pub last_page_path: String,
    /// Path to the next page counter in the payload
    pub next_page_path: String,
}

impl EnvelopePaginator {
    /// Create a new envelope paginator
    pub fn new(
        page_param: impl Into<String>,
        start_page: u32,
        page_path: impl Into<String>,
        last_page_path: impl Into<String>,
        next_page_path: impl Into<String>,
    ) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            per_page_param: None,
            per_page: None,
            window_param: None,
            page_path: page_path.into(),
            last_page_path: last_page_path.into(),
            next_page_path: next_page_path.into(),
        }
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.per_page_param = Some(param.into());
        self.per_page = Some(size);
        self
    }

    /// Set the window filter parameter
    #[must_use]
    pub fn with_window(mut self, param: impl Into<String>) -> Self {
        self.window_param = Some(param.into());
        self
    }

    fn counter(&self, response: &PageResponse, path: &str) -> Option<u32> {
        extract_path(&response.body, path).and_then(|v| v.as_u64().map(|n| n as u32))
    }
}

impl Paginator for EnvelopePaginator {
    fn initial(&self, window_start: Option<String>) -> PageCursor {
        PageCursor::new(self.start_page, window_start)
    }

    fn request(&self, cursor: &PageCursor) -> PageRequest {
        let mut request = PageRequest::new().with(&self.page_param, cursor.page.to_string());

        if let (Some(param), Some(size)) = (&self.per_page_param, self.per_page) {
            request = request.with(param, size.to_string());
        }
        if let (Some(param), Some(start)) = (&self.window_param, &cursor.window_start) {
            request = request.with(param, start);
        }

        request
    }

    fn next(&self, cursor: &PageCursor, response: &PageResponse) -> Option<PageCursor> {
        let page = self.counter(response, &self.page_path)?;
        let last_page = self.counter(response, &self.last_page_path)?;

        if page >= last_page {
            return None;
        }

        let next_page = self
            .counter(response, &self.next_page_path)
            .unwrap_or(page + 1);

        Some(PageCursor::new(next_page, cursor.window_start.clone()))
    }
}
