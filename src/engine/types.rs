//! Engine types
//!
//! Message types and configuration for the sync engine.

use crate::error::Result;
use crate::state::StreamState;
use crate::types::LogLevel;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

/// Type alias for the lazy message stream produced by a sync
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// A message emitted during sync
#[derive(Debug, Clone)]
pub enum Message {
    /// A single enriched record
    Record {
        /// Stream name
        stream: String,
        /// The record payload
        record: Value,
        /// Timestamp when the record was emitted
        emitted_at: DateTime<Utc>,
    },
    /// Cursor checkpoint, emitted after every fully processed page and after
    /// exhaustion
    State {
        /// Stream name
        stream: String,
        /// Checkpointed stream state
        state: StreamState,
    },
    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, record: Value) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            emitted_at: Utc::now(),
        }
    }

    /// Create a state message
    pub fn state(stream: impl Into<String>, state: StreamState) -> Self {
        Self::State {
            stream: stream.into(),
            state,
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a warning log
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }
}

/// Configuration for a sync invocation
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Maximum records to emit (0 = unlimited)
    pub max_records: usize,
    /// Whether to emit a state checkpoint after every page. The terminal
    /// checkpoint is emitted regardless.
    pub page_checkpoints: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_records: 0,
            page_checkpoints: true,
        }
    }
}

impl SyncOptions {
    /// Create default sync options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Enable or disable per-page checkpoints
    #[must_use]
    pub fn with_page_checkpoints(mut self, emit: bool) -> Self {
        self.page_checkpoints = emit;
        self
    }
}

#[cfg(test)]
mod message_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_kinds() {
        let record = Message::record("calls", json!({"id": 1}));
        assert!(record.is_record());
        assert!(!record.is_state());

        let state = Message::state("calls", StreamState::new());
        assert!(state.is_state());

        let log = Message::info("hello");
        assert!(log.is_log());
    }

    #[test]
    fn test_sync_options_builder() {
        let options = SyncOptions::new()
            .with_max_records(50)
            .with_page_checkpoints(false);

        assert_eq!(options.max_records, 50);
        assert!(!options.page_checkpoints);
    }
}
