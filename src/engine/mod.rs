//! Main execution engine
//!
//! The stream controller orchestrates authenticated page fetches, per-record
//! detail enrichment, and cursor tracking into one lazy, finite message
//! stream per sync invocation:
//!
//! ```text
//! INIT -> (seed cursor) -> REQUEST -> FETCH -> PARSE -> ENRICH* -> EMIT
//!      -> (observe cursor) -> {REQUEST if more pages | DONE}
//! ```
//!
//! The stream is pull-driven: the next page is fetched only when the consumer
//! pulls past the current page's records. A failure propagates through the
//! stream and ends it; the sync is then interrupted at the last emitted
//! checkpoint, which is always a page boundary.

mod types;

pub use types::{Message, MessageStream, SyncOptions};

use crate::enrich::Enricher;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{value_to_param, PageCursor, PageResponse, Paginator};
use crate::state::{CursorTracker, StreamState};
use crate::types::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Incremental-cursor configuration for a stream
#[derive(Debug, Clone)]
pub struct CursorSpec {
    /// Record field holding the cursor value
    pub cursor_field: String,
    /// Start watermark from static config, if any
    pub configured_start: Option<Value>,
    /// Query parameter for the window end bound, if the provider takes one
    pub end_param: Option<String>,
    /// Rendered window end value, sent only when a window start is in effect
    pub end_value: Option<String>,
}

impl CursorSpec {
    /// Create a cursor spec for a field with an optional configured start
    pub fn new(cursor_field: impl Into<String>, configured_start: Option<Value>) -> Self {
        Self {
            cursor_field: cursor_field.into(),
            configured_start,
            end_param: None,
            end_value: None,
        }
    }

    /// Set the window end bound
    #[must_use]
    pub fn with_end(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.end_param = Some(param.into());
        self.end_value = Some(value.into());
        self
    }
}

/// Orchestrates one stream's sync: pagination, enrichment, cursor tracking.
///
/// A controller is consumed by [`StreamController::run`]; restarting a sync
/// means building a fresh controller and invoking `run` with fresh state.
pub struct StreamController {
    name: String,
    client: Arc<HttpClient>,
    paginator: Arc<dyn Paginator>,
    method: Method,
    path: String,
    base_params: HashMap<String, String>,
    headers: HashMap<String, String>,
    data_field: Option<String>,
    enrichers: Vec<Arc<dyn Enricher>>,
    cursor: Option<CursorSpec>,
    options: SyncOptions,
}

impl StreamController {
    /// Create a controller for a stream endpoint
    pub fn new(
        name: impl Into<String>,
        client: Arc<HttpClient>,
        paginator: Arc<dyn Paginator>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            paginator,
            method: Method::GET,
            path: path.into(),
            base_params: HashMap::new(),
            headers: HashMap::new(),
            data_field: None,
            enrichers: Vec::new(),
            cursor: None,
            options: SyncOptions::default(),
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set base query parameters sent with every page
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.base_params = params;
        self
    }

    /// Set request headers
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the payload key holding the record array (absent = bare array)
    #[must_use]
    pub fn with_data_field(mut self, field: impl Into<String>) -> Self {
        self.data_field = Some(field.into());
        self
    }

    /// Add an enrichment step applied to every record in order
    #[must_use]
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enrichers.push(enricher);
        self
    }

    /// Make the stream incremental with the given cursor spec
    #[must_use]
    pub fn with_cursor(mut self, spec: CursorSpec) -> Self {
        self.cursor = Some(spec);
        self
    }

    /// Set sync options
    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the sync, producing a lazy, finite message stream.
    ///
    /// The tracker is seeded with the host-persisted prior state; the
    /// effective start watermark (the later of configured start and seed)
    /// filters the first page request. A checkpoint message follows every
    /// fully processed page; the last one emitted is the final cursor state.
    pub fn run(self, seeded: Option<StreamState>) -> MessageStream {
        let tracker = self.cursor.as_ref().map(|spec| {
            let mut tracker =
                CursorTracker::new(spec.cursor_field.clone(), spec.configured_start.clone());
            if let Some(prior) = &seeded {
                tracker.seed(prior.cursor.as_ref());
            }
            tracker
        });

        let initial_window = tracker
            .as_ref()
            .and_then(CursorTracker::effective_start)
            .and_then(value_to_param);
        let page = self.paginator.initial(initial_window);

        let state = SyncState {
            controller: self,
            page: Some(page),
            pending: VecDeque::new(),
            tracker,
            checkpoint_due: false,
            records: 0,
            pages: 0,
            announced: false,
            summarized: false,
        };

        Box::pin(futures::stream::try_unfold(state, |state| async move {
            step(state).await
        }))
    }

    /// Fetch and parse one page
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<PageResponse> {
        let page_request = self.paginator.request(cursor);

        let mut config = RequestConfig::new()
            .queries(&self.base_params)
            .queries(&page_request.query);
        for (key, value) in &self.headers {
            config = config.header(key, value);
        }

        // The window end bound only applies when a window start is in effect
        if let Some(spec) = &self.cursor {
            if cursor.window_start.is_some() {
                if let (Some(param), Some(value)) = (&spec.end_param, &spec.end_value) {
                    config = config.query(param, value);
                }
            }
        }

        let response = self
            .client
            .request(self.method.into(), &self.path, config)
            .await?;
        let body: Value = response.json().await.map_err(Error::Http)?;

        PageResponse::parse(body, self.data_field.as_deref())
    }
}

impl std::fmt::Debug for StreamController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamController")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("data_field", &self.data_field)
            .field("incremental", &self.cursor.is_some())
            .field("enrichers", &self.enrichers.len())
            .finish_non_exhaustive()
    }
}

/// Walking state of one sync invocation
struct SyncState {
    controller: StreamController,
    /// Cursor of the next page to fetch; `None` once pagination ended
    page: Option<PageCursor>,
    /// Records of the current page not yet emitted
    pending: VecDeque<Value>,
    tracker: Option<CursorTracker>,
    /// A page finished draining and its checkpoint has not been emitted yet
    checkpoint_due: bool,
    records: usize,
    pages: usize,
    announced: bool,
    summarized: bool,
}

/// Produce the next message of the sync, or `None` when exhausted
async fn step(mut st: SyncState) -> Result<Option<(Message, SyncState)>> {
    if !st.announced {
        st.announced = true;
        let msg = format!("Starting sync for stream: {}", st.controller.name);
        return Ok(Some((Message::info(msg), st)));
    }

    loop {
        // Emit the next record of the current page
        if let Some(mut record) = st.pending.pop_front() {
            let enrichers = st.controller.enrichers.clone();
            for enricher in &enrichers {
                enricher
                    .enrich(st.controller.client.as_ref(), &mut record)
                    .await?;
            }

            if let Some(tracker) = st.tracker.as_mut() {
                tracker.observe(&record);
            }

            st.records += 1;
            if st.controller.options.max_records > 0
                && st.records >= st.controller.options.max_records
            {
                st.pending.clear();
                st.page = None;
            }

            let name = st.controller.name.clone();
            return Ok(Some((Message::record(name, record), st)));
        }

        // Page fully drained: checkpoint at the page boundary
        if st.checkpoint_due {
            st.checkpoint_due = false;
            let terminal = st.page.is_none();
            if st.controller.options.page_checkpoints || terminal {
                if let Some(state) = st.tracker.as_ref().and_then(CursorTracker::state) {
                    let name = st.controller.name.clone();
                    return Ok(Some((Message::state(name, state), st)));
                }
            }
            continue;
        }

        // Fetch the next page, or wind down
        let Some(cursor) = st.page.take() else {
            if !st.summarized {
                st.summarized = true;
                let msg = format!(
                    "Completed sync for {}: {} records in {} pages",
                    st.controller.name, st.records, st.pages
                );
                return Ok(Some((Message::info(msg), st)));
            }
            return Ok(None);
        };

        let page = st.controller.fetch_page(&cursor).await?;
        st.pages += 1;
        debug!(
            stream = %st.controller.name,
            page = cursor.page,
            records = page.len(),
            "fetched page"
        );

        st.page = st.controller.paginator.next(&cursor, &page);
        st.pending = page.records.into();
        st.checkpoint_due = true;
    }
}
