//! Loader types
//!
//! Declarative connector definition types for YAML parsing. Provider variants
//! (page numbering origin, field lists, enrichment endpoints) are data here,
//! not code.

use crate::config::SpecConfig;
use crate::types::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Connector Definition
// ============================================================================

/// Top-level connector definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectorDefinition {
    /// Connector name
    pub name: String,
    /// Connector version
    #[serde(default = "default_version")]
    pub version: String,
    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Base URL for all requests
    pub base_url: String,
    /// Configuration specification (for UI/validation)
    #[serde(default)]
    pub spec: SpecConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: Option<AuthDefinition>,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpDefinition,
    /// Connection check configuration
    #[serde(default)]
    pub check: Option<CheckDefinition>,
    /// Stream definitions
    pub streams: Vec<StreamDefinition>,
    /// Global headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Connection check configuration.
///
/// The check issues one lightweight authenticated probe and, when a marker
/// field is declared, requires it to be present in the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckDefinition {
    /// URL path for the probe endpoint
    pub path: String,
    /// Query parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// Field expected in the probe response body
    #[serde(default)]
    pub marker_field: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

// ============================================================================
// Auth Definition
// ============================================================================

/// Authentication definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthDefinition {
    /// API key authentication
    ApiKey {
        /// Header or query param name
        key: String,
        /// Value (usually a template like `{{ config.api_key }}`)
        value: String,
        /// Location: header or query
        #[serde(default = "default_auth_location")]
        location: String,
        /// Prefix prepended to the value
        #[serde(default)]
        prefix: Option<String>,
    },
    /// Basic authentication
    Basic {
        /// Username (template)
        username: String,
        /// Password (template)
        password: String,
    },
    /// Bearer token authentication
    Bearer {
        /// Token value (template)
        token: String,
    },
    /// Session login plus refresh-token exchange
    SessionRefresh {
        /// Login endpoint path
        signin_path: String,
        /// Login identity (template)
        email: String,
        /// Login secret (template)
        password: String,
        /// Refresh exchange endpoint path
        refresh_path: String,
        /// Access token lifetime in seconds
        #[serde(default = "default_token_lifetime")]
        token_lifetime_secs: u64,
    },
    /// No authentication
    None,
}

fn default_auth_location() -> String {
    "header".to_string()
}

fn default_token_lifetime() -> u64 {
    900
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Rate limit (requests per second)
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            rate_limit_rps: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

// ============================================================================
// Stream Definition
// ============================================================================

/// Stream definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamDefinition {
    /// Stream name
    pub name: String,
    /// Request configuration
    pub request: RequestDefinition,
    /// Payload key holding the record array (absent = bare array payload)
    #[serde(default)]
    pub data_field: Option<String>,
    /// Primary key fields
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Incremental sync configuration
    #[serde(default)]
    pub incremental: Option<IncrementalDefinition>,
    /// Pagination configuration
    #[serde(default)]
    pub pagination: Option<PaginationDefinition>,
    /// Detail enrichment steps, applied per record in order
    #[serde(default)]
    pub enrich: Vec<EnrichmentDefinition>,
    /// Stream-specific headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestDefinition {
    /// HTTP method
    #[serde(default)]
    pub method: Method,
    /// URL path (can contain templates)
    pub path: String,
    /// Query parameters (values can contain templates)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

// ============================================================================
// Incremental Definition
// ============================================================================

/// Incremental sync configuration for a stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IncrementalDefinition {
    /// Record field holding the cursor value
    pub cursor_field: String,
    /// Query parameter carrying the window start filter
    #[serde(default)]
    pub start_param: Option<String>,
    /// Template binding the configured start watermark
    #[serde(default)]
    pub start_value: Option<String>,
    /// Fallback watermark when the config does not provide one
    #[serde(default)]
    pub start_default: Option<Value>,
    /// Query parameter carrying the window end bound
    #[serde(default)]
    pub end_param: Option<String>,
    /// How far behind now the window end bound sits, in seconds
    #[serde(default)]
    pub end_lag_secs: Option<u64>,
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationDefinition {
    /// No pagination, a single request
    None,
    /// Fixed-size pages; a short page is the last
    ShortPage {
        /// Page counter parameter name
        #[serde(default = "default_page_param")]
        page_param: String,
        /// First page number
        #[serde(default = "default_start_page")]
        start_page: u32,
        /// Page size parameter name
        #[serde(default = "default_per_page_param")]
        per_page_param: String,
        /// Page size
        per_page: u32,
        /// Provider cap on records retrievable within one window
        #[serde(default)]
        max_records: Option<u64>,
        /// Record field used to re-window past the cap
        #[serde(default)]
        creation_field: Option<String>,
    },
    /// Explicit page-counter envelope in the payload
    Envelope {
        /// Page counter parameter name
        #[serde(default = "default_page_param")]
        page_param: String,
        /// First page number
        #[serde(default = "default_start_page")]
        start_page: u32,
        /// Page size parameter name
        #[serde(default)]
        per_page_param: Option<String>,
        /// Page size
        #[serde(default)]
        per_page: Option<u32>,
        /// Path to the current page counter
        page_path: String,
        /// Path to the last page counter
        last_page_path: String,
        /// Path to the next page counter
        next_page_path: String,
    },
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_per_page_param() -> String {
    "per_page".to_string()
}

// ============================================================================
// Enrichment Definition
// ============================================================================

/// Detail enrichment definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EnrichmentDefinition {
    /// Detail endpoint path template (e.g. `call-details/{{ record.id }}`)
    pub path: String,
    /// Fields copied from the detail payload into the record
    pub fields: Vec<String>,
    /// Record field carrying the primary id
    #[serde(default)]
    pub id_field: Option<String>,
}
