//! Auth configuration types
//!
//! These types represent the runtime auth configuration after template
//! interpolation has been applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// Authentication configuration (after template interpolation)
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// API Key authentication (header or query)
    ApiKey {
        /// Where to place the API key
        location: Location,
        /// Header name (for header location)
        header_name: Option<String>,
        /// Query parameter name (for query location)
        query_param: Option<String>,
        /// Prefix to add before the value (e.g., "Bearer ")
        prefix: Option<String>,
        /// The API key value
        value: String,
    },

    /// HTTP Basic authentication.
    ///
    /// The credential is assembled as `base64(username:password)`, the form
    /// telephony APIs expect for api-id/api-token pairs.
    Basic {
        /// Username (api id)
        username: String,
        /// Password (api token)
        password: String,
    },

    /// Static bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Session login plus refresh-token exchange (OAuth-style).
    ///
    /// A login call trades identity/secret for a long-lived refresh token;
    /// every signing attempt exchanges that refresh token for a short-lived
    /// access token once the cached one has expired. The exchange response
    /// rotates the refresh token.
    SessionRefresh {
        /// Login endpoint URL
        signin_url: String,
        /// Login identity
        email: String,
        /// Login secret
        password: String,
        /// Refresh-token exchange endpoint URL
        refresh_url: String,
        /// Access token lifetime when the exchange response carries no expiry
        token_lifetime_secs: u64,
    },
}

/// Cached access token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires (None = never)
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}

/// Cached credentials for the session-refresh flow
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    /// Current access token, if any
    pub access: Option<CachedToken>,
    /// Current refresh token; rotated on every exchange
    pub refresh: Option<String>,
}
