//! # calldeck
//!
//! A minimal, Rust-native toolkit for building call-intelligence source
//! connectors: pull paginated records from telephony SaaS REST APIs and emit
//! them as normalized records with incremental-sync checkpoints.
//!
//! ## Features
//!
//! - **Declarative connectors**: providers are YAML configuration, not code
//! - **Multiple auth types**: basic, bearer, API key, session-refresh exchange
//! - **Pagination strategies**: short-page-is-last, envelope page counters,
//!   page-depth-ceiling re-windowing
//! - **Incremental sync**: cursor watermarks with monotonic resume
//! - **Detail enrichment**: per-record secondary fetches, fail-fast
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use calldeck::config::ConfiguredCatalog;
//! use calldeck::connector::{ApiConnector, Connector};
//! use calldeck::loader::load_connector;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> calldeck::Result<()> {
//!     let connector = ApiConnector::new(load_connector("aircall")?);
//!
//!     let config = serde_json::json!({ "api_id": "...", "api_token": "..." });
//!     let status = connector.check(&config).await?;
//!
//!     let catalog = connector.discover(&config).await?;
//!     let configured = ConfiguredCatalog::select_all(&catalog);
//!
//!     let mut messages = connector.read(&config, &configured, None).await?;
//!     while let Some(message) = messages.next().await {
//!         // Records, state checkpoints, logs
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector Interface                         │
//! │  spec() → ConnectorSpec   check() → CheckResult                 │
//! │  discover() → Catalog     read(catalog, state) → MessageStream  │
//! └───────────────────────────────┬─────────────────────────────────┘
//! ┌──────────┬───────────┬────────┴──────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Cursor   │   Enrich    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Basic    │ Retry     │ Short page    │ Watermark │ Detail GET  │
//! │ Bearer   │ Backoff   │ Envelope      │ Seed/max  │ per record  │
//! │ API key  │ Rate limit│ Depth ceiling │ Checkpoint│ Fail fast   │
//! │ Session  │           │ re-window     │           │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Runtime config validation and catalog types
pub mod config;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// State management and checkpointing
pub mod state;

/// Record enrichment via detail endpoints
pub mod enrich;

/// Main execution engine
pub mod engine;

/// Connector trait and definition-driven connector
pub mod connector;

/// YAML loader for connector definitions
pub mod loader;

/// Template interpolation
pub mod template;

/// Built-in connector definitions
pub mod connectors;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use loader::{load_connector, load_connector_from_str, ConnectorDefinition};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
