//! Authenticator implementation
//!
//! Applies authentication to outgoing requests and manages the
//! session-refresh token lifecycle.

use super::types::{AuthConfig, CachedToken, Location, TokenCache};
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached tokens for the session-refresh flow
    cache: Arc<RwLock<TokenCache>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cache: Arc::new(RwLock::new(TokenCache::default())),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),

            AuthConfig::ApiKey {
                location,
                header_name,
                query_param,
                prefix,
                value,
            } => {
                let val = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
                match location {
                    Location::Header => {
                        let header = header_name.as_deref().unwrap_or("Authorization");
                        Ok(req.header(header, val))
                    }
                    Location::Query => {
                        let param = query_param.as_deref().unwrap_or("api_key");
                        Ok(req.query(&[(param, val)]))
                    }
                }
            }

            AuthConfig::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{username}:{password}"));
                Ok(req.header("Authorization", format!("Basic {encoded}")))
            }

            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),

            AuthConfig::SessionRefresh { .. } => {
                let token = self.get_or_exchange_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// Get a valid access token, exchanging the refresh token if necessary.
    ///
    /// Lazy, at most one exchange per expiry window: callers racing for an
    /// expired token double-check under the write lock so only the first
    /// performs the network exchange.
    async fn get_or_exchange_token(&self) -> Result<String> {
        let AuthConfig::SessionRefresh {
            signin_url,
            email,
            password,
            refresh_url,
            token_lifetime_secs,
        } = &self.config
        else {
            return Err(Error::auth("Token exchange requires session_refresh auth"));
        };

        // Fast path: valid cached token
        {
            let cache = self.cache.read().await;
            if let Some(token) = cache.access.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Double-check after acquiring the write lock
        if let Some(token) = cache.access.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        // Login once to obtain the initial refresh token
        let refresh = match cache.refresh.clone() {
            Some(refresh) => refresh,
            None => self.signin(signin_url, email, password).await?,
        };

        let exchanged = self.exchange(refresh_url, &refresh).await?;
        debug!("exchanged refresh token for a new access token");

        if let Some(rotated) = exchanged.refresh_token {
            cache.refresh = Some(rotated);
        } else {
            cache.refresh = Some(refresh);
        }

        let lifetime = exchanged
            .expires_in
            .unwrap_or(*token_lifetime_secs as i64);
        let token = CachedToken::expires_in(exchanged.access_token, lifetime);
        let token_str = token.token.clone();
        cache.access = Some(token);

        Ok(token_str)
    }

    /// Log in with identity/secret and return the refresh token
    async fn signin(&self, signin_url: &str, email: &str, password: &str) -> Result<String> {
        let response = self
            .http_client
            .post(signin_url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                message: format!("Login request failed with status {status}: {body}"),
            });
        }

        let body: SigninResponse = response.json().await.map_err(Error::Http)?;
        Ok(body.refresh_token)
    }

    /// Exchange a refresh token for a fresh access token
    async fn exchange(&self, refresh_url: &str, refresh_token: &str) -> Result<TokenResponse> {
        let response = self
            .http_client
            .post(refresh_url)
            .form(&[("token", refresh_token)])
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenExchange {
                message: format!("Refresh request failed with status {status}: {body}"),
            });
        }

        response.json().await.map_err(Error::Http)
    }

    /// Clear cached tokens (useful for testing or forced refresh)
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = TokenCache::default();
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Login response carrying the long-lived refresh token
#[derive(Debug, Deserialize)]
struct SigninResponse {
    #[serde(alias = "refreshToken")]
    refresh_token: String,
}

/// Refresh-token exchange response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}
