//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Complete state for a connector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get cursor for a stream
    pub fn get_cursor(&self, stream: &str) -> Option<&Value> {
        self.streams.get(stream)?.cursor.as_ref()
    }

    /// Set cursor for a stream
    pub fn set_cursor(&mut self, stream: &str, cursor: Value) {
        self.get_stream_mut(stream).cursor = Some(cursor);
    }
}

/// State for a single stream.
///
/// The cursor value keeps the provider's own type: unix-timestamp cursors
/// stay numbers, ISO-8601 cursors stay strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamState {
    /// Watermark value for incremental sync
    #[serde(default)]
    pub cursor: Option<Value>,

    /// Field the watermark was derived from
    #[serde(default)]
    pub cursor_field: Option<String>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream state with a cursor value
    pub fn with_cursor(cursor_field: impl Into<String>, cursor: Value) -> Self {
        Self {
            cursor: Some(cursor),
            cursor_field: Some(cursor_field.into()),
        }
    }
}
