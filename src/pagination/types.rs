//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.
//! Progress through a paginated listing is an explicit immutable snapshot
//! (`PageCursor`) threaded through each step rather than hidden mutable
//! counters, so a resumed or re-windowed scan is replayable in tests.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Immutable snapshot of pagination progress.
///
/// `window_start` carries the time-window filter for the current scan; a
/// page-depth re-window replaces it and resets `page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Page counter for the current window
    pub page: u32,
    /// Lower bound of the current time window, rendered as a query value
    pub window_start: Option<String>,
}

impl PageCursor {
    /// Create a cursor at the given page with an optional window start
    pub fn new(page: u32, window_start: Option<String>) -> Self {
        Self { page, window_start }
    }
}

/// Query parameters for one page request.
///
/// Built fresh per page by a [`Paginator`] from its configuration and the
/// current [`PageCursor`]; the stream controller merges these with the
/// stream's base parameters.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Query parameters to send
    pub query: HashMap<String, String>,
}

impl PageRequest {
    /// Create an empty page request
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// A decoded page payload with its extracted record array.
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// Full decoded payload (for pagination envelopes)
    pub body: Value,
    /// Records extracted from the data field
    pub records: Vec<Value>,
}

impl PageResponse {
    /// Extract records from a payload.
    ///
    /// With a data field, the payload must be an object whose named key holds
    /// the record array. Without one, the payload itself must be the array
    /// (some providers return bare arrays for secondary listings).
    pub fn parse(body: Value, data_field: Option<&str>) -> Result<Self> {
        let records = match data_field {
            Some(field) => match body.get(field) {
                Some(Value::Array(items)) => items.clone(),
                Some(other) => {
                    return Err(Error::record_extraction(
                        field,
                        format!("expected an array, got {}", type_name(other)),
                    ))
                }
                None => {
                    return Err(Error::record_extraction(field, "field not present"));
                }
            },
            None => match &body {
                Value::Array(items) => items.clone(),
                other => {
                    return Err(Error::record_extraction(
                        "<root>",
                        format!("expected an array payload, got {}", type_name(other)),
                    ))
                }
            },
        };

        Ok(Self { body, records })
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page carried no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Value of a field on the last record, rendered as a query value
    pub fn last_record_value(&self, field: &str) -> Option<String> {
        self.records.last().and_then(|r| {
            let value = r.get(field)?;
            value_to_param(value)
        })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Core trait for pagination strategies.
///
/// Strategies are pure with respect to the cursor: `next` derives the
/// following snapshot (or `None` when pagination ends) without mutating
/// anything.
pub trait Paginator: Send + Sync {
    /// Cursor for the first page of a scan starting at `window_start`
    fn initial(&self, window_start: Option<String>) -> PageCursor;

    /// Query parameters for the page the cursor points at
    fn request(&self, cursor: &PageCursor) -> PageRequest;

    /// Derive the next cursor from a page response, or `None` when done
    fn next(&self, cursor: &PageCursor, response: &PageResponse) -> Option<PageCursor>;
}

/// Navigate a dot-separated path into a JSON object
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a JSON scalar as a query parameter value
pub fn value_to_param(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
