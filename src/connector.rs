//! Connector trait and the definition-driven connector
//!
//! Defines the core Connector surface (spec, check, discover, read) and the
//! `ApiConnector` that binds a declarative YAML definition plus user config
//! into running stream controllers.

use crate::auth::{AuthConfig, Location};
use crate::config::{validate_config, Catalog, CatalogStream, ConfiguredCatalog, SpecConfig};
use crate::engine::{CursorSpec, MessageStream, StreamController, SyncOptions};
use crate::enrich::{DetailEnricher, Enricher};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::loader::{
    AuthDefinition, ConnectorDefinition, PaginationDefinition, StreamDefinition,
};
use crate::pagination::{
    EnvelopePaginator, Paginator, ShortPagePaginator, SinglePagePaginator,
};
use crate::state::State;
use crate::template::{self, TemplateContext};
use crate::types::{OptionStringExt, SyncMode};
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Connector Spec (for UI)
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// Configuration specification
    pub spec: SpecConfig,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Diagnostic message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Core trait that all connectors implement
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector specification (for UI/validation)
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    async fn check(&self, config: &Value) -> Result<CheckResult>;

    /// Lists available streams from the source
    async fn discover(&self, config: &Value) -> Result<Catalog>;

    /// Reads data from selected streams
    ///
    /// Returns a lazy stream of messages (records, state checkpoints, logs).
    async fn read(
        &self,
        config: &Value,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream>;
}

// ============================================================================
// Definition-Driven Connector
// ============================================================================

/// A connector resolved from a declarative YAML definition
pub struct ApiConnector {
    /// The parsed definition
    definition: ConnectorDefinition,
    /// Sync options applied to every stream
    options: SyncOptions,
}

impl ApiConnector {
    /// Create a connector from a parsed definition
    pub fn new(definition: ConnectorDefinition) -> Self {
        Self {
            definition,
            options: SyncOptions::default(),
        }
    }

    /// Create a connector from a YAML definition string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(Self::new(crate::loader::load_connector_from_str(yaml)?))
    }

    /// Set sync options
    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying definition
    pub fn definition(&self) -> &ConnectorDefinition {
        &self.definition
    }

    /// Join a possibly-relative path onto the connector base URL
    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.definition.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Resolve the auth definition against user config
    fn resolve_auth(&self, ctx: &TemplateContext) -> Result<AuthConfig> {
        let Some(auth) = &self.definition.auth else {
            return Ok(AuthConfig::None);
        };

        let resolved = match auth {
            AuthDefinition::None => AuthConfig::None,

            AuthDefinition::ApiKey {
                key,
                value,
                location,
                prefix,
            } => {
                let location = match location.as_str() {
                    "query" => Location::Query,
                    _ => Location::Header,
                };
                AuthConfig::ApiKey {
                    location,
                    header_name: Some(key.clone()),
                    query_param: Some(key.clone()),
                    prefix: prefix.clone(),
                    value: template::render(value, ctx)?,
                }
            }

            AuthDefinition::Basic { username, password } => AuthConfig::Basic {
                username: template::render(username, ctx)?,
                password: template::render(password, ctx)?,
            },

            AuthDefinition::Bearer { token } => AuthConfig::Bearer {
                token: template::render(token, ctx)?,
            },

            AuthDefinition::SessionRefresh {
                signin_path,
                email,
                password,
                refresh_path,
                token_lifetime_secs,
            } => AuthConfig::SessionRefresh {
                signin_url: self.absolute_url(signin_path),
                email: template::render(email, ctx)?,
                password: template::render(password, ctx)?,
                refresh_url: self.absolute_url(refresh_path),
                token_lifetime_secs: *token_lifetime_secs,
            },
        };

        Ok(resolved)
    }

    /// Build the shared HTTP client for this connector
    fn build_client(&self, ctx: &TemplateContext) -> Result<Arc<HttpClient>> {
        let http = &self.definition.http;

        let mut builder = HttpClientConfig::builder()
            .base_url(&self.definition.base_url)
            .timeout(Duration::from_secs(http.timeout_secs))
            .max_retries(http.max_retries);

        builder = match http.rate_limit_rps {
            Some(rps) => builder.rate_limit(RateLimiterConfig::new(rps, rps)),
            None => builder.no_rate_limit(),
        };

        if let Some(agent) = &http.user_agent {
            builder = builder.user_agent(agent);
        }

        for (key, value) in &self.definition.headers {
            builder = builder.header(key, template::render(value, ctx)?);
        }

        let auth = self.resolve_auth(ctx)?;
        Ok(Arc::new(HttpClient::with_auth(builder.build(), auth)))
    }

    /// Build the paginator for a stream
    fn build_paginator(
        stream: &StreamDefinition,
        window_param: Option<&str>,
    ) -> Arc<dyn Paginator> {
        match &stream.pagination {
            None | Some(PaginationDefinition::None) => Arc::new(SinglePagePaginator),

            Some(PaginationDefinition::ShortPage {
                page_param,
                start_page,
                per_page_param,
                per_page,
                max_records,
                creation_field,
            }) => {
                let mut paginator =
                    ShortPagePaginator::new(page_param, *start_page, per_page_param, *per_page);
                if let Some(param) = window_param {
                    paginator = paginator.with_window(param);
                }
                if let (Some(max), Some(field)) = (max_records, creation_field) {
                    paginator = paginator.with_depth_ceiling(*max, field);
                }
                Arc::new(paginator)
            }

            Some(PaginationDefinition::Envelope {
                page_param,
                start_page,
                per_page_param,
                per_page,
                page_path,
                last_page_path,
                next_page_path,
            }) => {
                let mut paginator = EnvelopePaginator::new(
                    page_param,
                    *start_page,
                    page_path,
                    last_page_path,
                    next_page_path,
                );
                if let (Some(param), Some(size)) = (per_page_param, per_page) {
                    paginator = paginator.with_page_size(param, *size);
                }
                if let Some(param) = window_param {
                    paginator = paginator.with_window(param);
                }
                Arc::new(paginator)
            }
        }
    }

    /// Resolve a stream definition into a runnable controller
    fn resolve_stream(
        &self,
        stream: &StreamDefinition,
        ctx: &TemplateContext,
        client: Arc<HttpClient>,
    ) -> Result<StreamController> {
        let path = template::render(&stream.request.path, ctx)?;

        let mut params = HashMap::new();
        for (key, value) in &stream.request.params {
            if let Some(rendered) = template::render_optional(value, ctx).none_if_empty() {
                params.insert(key.clone(), rendered);
            }
        }

        let cursor = stream
            .incremental
            .as_ref()
            .map(|inc| {
                let configured_start = inc
                    .start_value
                    .as_deref()
                    .map(|tpl| template::render_optional(tpl, ctx))
                    .and_then(OptionStringExt::none_if_empty)
                    .map(|s| coerce_scalar(&s))
                    .or_else(|| inc.start_default.clone());

                let mut spec = CursorSpec::new(&inc.cursor_field, configured_start);
                if let (Some(param), Some(lag)) = (&inc.end_param, inc.end_lag_secs) {
                    let end = Utc::now() - chrono::Duration::seconds(lag as i64);
                    spec = spec.with_end(param, end.format("%Y-%m-%dT%H:%M:%S.000Z").to_string());
                }
                spec
            });

        let window_param = stream
            .incremental
            .as_ref()
            .and_then(|inc| inc.start_param.as_deref());
        let paginator = Self::build_paginator(stream, window_param);

        let mut headers = HashMap::new();
        for (key, value) in &stream.headers {
            headers.insert(key.clone(), template::render(value, ctx)?);
        }

        let mut controller = StreamController::new(&stream.name, client, paginator, path)
            .with_method(stream.request.method)
            .with_params(params)
            .with_headers(headers)
            .with_options(self.options.clone());

        if let Some(field) = &stream.data_field {
            controller = controller.with_data_field(field);
        }
        if let Some(spec) = cursor {
            controller = controller.with_cursor(spec);
        }
        for enrich in &stream.enrich {
            let mut enricher = DetailEnricher::new(&enrich.path, enrich.fields.clone());
            if let Some(id_field) = &enrich.id_field {
                enricher = enricher.with_id_field(id_field);
            }
            let enricher: Arc<dyn Enricher> = Arc::new(enricher);
            controller = controller.with_enricher(enricher);
        }

        Ok(controller)
    }

    /// Probe the provider and inspect the response for the marker field
    async fn probe(&self, config: &Value) -> Result<()> {
        validate_config(&self.definition.spec, config)?;

        let Some(check) = &self.definition.check else {
            return Ok(());
        };

        let ctx = TemplateContext::with_config(config.clone());
        let client = self.build_client(&ctx)?;

        let mut request = RequestConfig::new();
        for (key, value) in &check.params {
            if let Some(rendered) = template::render_optional(value, &ctx).none_if_empty() {
                request = request.query(key, rendered);
            }
        }

        let body: Value = client.get_json_with_config(&check.path, request).await?;

        if let Some(marker) = &check.marker_field {
            if body.get(marker).is_none() {
                return Err(Error::ConnectionCheck {
                    message: format!("marker field '{marker}' missing from probe response"),
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Connector for ApiConnector {
    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            name: self.definition.name.clone(),
            title: self
                .definition
                .title
                .clone()
                .unwrap_or_else(|| self.definition.name.clone()),
            description: self.definition.description.clone(),
            spec: self.definition.spec.clone(),
        }
    }

    async fn check(&self, config: &Value) -> Result<CheckResult> {
        // The two-valued check surface: every failure becomes a diagnostic,
        // only the probe outcome decides success.
        match self.probe(config).await {
            Ok(()) => Ok(CheckResult::success()),
            Err(e) => Ok(CheckResult::failure(e.to_string())),
        }
    }

    async fn discover(&self, _config: &Value) -> Result<Catalog> {
        let streams = self
            .definition
            .streams
            .iter()
            .map(|s| CatalogStream {
                name: s.name.clone(),
                supported_sync_modes: if s.incremental.is_some() {
                    vec![SyncMode::FullRefresh, SyncMode::Incremental]
                } else {
                    vec![SyncMode::FullRefresh]
                },
                default_cursor_field: s.incremental.as_ref().map(|i| i.cursor_field.clone()),
                source_defined_primary_key: if s.primary_key.is_empty() {
                    None
                } else {
                    Some(s.primary_key.clone())
                },
            })
            .collect();

        Ok(Catalog { streams })
    }

    async fn read(
        &self,
        config: &Value,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream> {
        validate_config(&self.definition.spec, config)?;

        let ctx = TemplateContext::with_config(config.clone());
        // One client per sync: streams share the authenticator and its
        // cached tokens.
        let client = self.build_client(&ctx)?;

        let mut streams: Vec<MessageStream> = Vec::new();
        for configured in &catalog.streams {
            let definition = self
                .definition
                .streams
                .iter()
                .find(|s| s.name == configured.name)
                .ok_or_else(|| Error::StreamNotFound {
                    stream: configured.name.clone(),
                })?;

            let controller = self.resolve_stream(definition, &ctx, Arc::clone(&client))?;

            let seeded = match configured.sync_mode {
                SyncMode::Incremental => state
                    .and_then(|s| s.get_stream(&configured.name))
                    .cloned(),
                SyncMode::FullRefresh => None,
            };

            streams.push(controller.run(seeded));
        }

        // Streams run strictly one after another; no parallel execution.
        // The first error ends the whole read (fail-fast, the sync is
        // interrupted at the last emitted checkpoint).
        let combined = futures::stream::iter(streams).flatten().scan(
            false,
            |errored, item| {
                if *errored {
                    return futures::future::ready(None);
                }
                *errored = item.is_err();
                futures::future::ready(Some(item))
            },
        );

        Ok(Box::pin(combined))
    }
}

/// Coerce a rendered template value back to a JSON scalar.
///
/// Integer-shaped strings become numbers so unix-timestamp watermarks
/// compare numerically against record values; everything else stays a
/// string.
fn coerce_scalar(s: &str) -> Value {
    if let Ok(n) = s.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::from(f);
    }
    Value::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn definition_for(server: &MockServer) -> String {
        format!(
            r#"
name: aircall-test
base_url: "{}"
spec:
  properties:
    api_id:
      type: string
      required: true
    api_token:
      type: string
      required: true
      secret: true
auth:
  type: basic
  username: "{{{{ config.api_id }}}}"
  password: "{{{{ config.api_token }}}}"
check:
  path: "/ping"
  marker_field: "ping"
streams:
  - name: calls
    request:
      path: "/calls"
    data_field: calls
    primary_key: [id]
    incremental:
      cursor_field: started_at
      start_param: from
      start_value: "{{{{ config.start_time }}}}"
      start_default: 0
    pagination:
      type: short_page
      per_page: 20
"#,
            server.uri()
        )
    }

    #[test]
    fn test_spec_uses_definition_metadata() {
        let connector = ApiConnector::from_yaml(
            r#"
name: modjo
title: "Modjo"
description: "Call intelligence"
base_url: "https://api.modjo.ai"
streams:
  - name: topics
    request:
      path: "/topics"
"#,
        )
        .unwrap();

        let spec = connector.spec();
        assert_eq!(spec.name, "modjo");
        assert_eq!(spec.title, "Modjo");
        assert_eq!(spec.description.as_deref(), Some("Call intelligence"));
    }

    #[tokio::test]
    async fn test_check_succeeds_on_marker() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ping": "pong"})),
            )
            .mount(&mock_server)
            .await;

        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();
        let result = connector
            .check(&json!({"api_id": "id", "api_token": "tok"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.message.is_none());
    }

    #[tokio::test]
    async fn test_check_fails_without_marker() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&mock_server)
            .await;

        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();
        let result = connector
            .check(&json!({"api_id": "id", "api_token": "tok"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.message.unwrap().contains("ping"));
    }

    #[tokio::test]
    async fn test_check_fails_on_missing_config_before_any_request() {
        let mock_server = MockServer::start().await;

        // No mocks mounted: a request would fail the test via 404 anyway,
        // but config validation must reject first.
        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();
        let result = connector.check(&json!({"api_id": "id"})).await.unwrap();

        assert!(!result.success);
        assert!(result.message.unwrap().contains("api_token"));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_reports_auth_rejection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&mock_server)
            .await;

        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();
        let result = connector
            .check(&json!({"api_id": "id", "api_token": "bad"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.message.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_discover_lists_streams_with_modes() {
        let mock_server = MockServer::start().await;
        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();

        let catalog = connector.discover(&json!({})).await.unwrap();

        assert_eq!(catalog.streams.len(), 1);
        let calls = &catalog.streams[0];
        assert_eq!(calls.name, "calls");
        assert_eq!(calls.supported_sync_modes.len(), 2);
        assert_eq!(calls.default_cursor_field.as_deref(), Some("started_at"));
        assert_eq!(
            calls.source_defined_primary_key,
            Some(vec!["id".to_string()])
        );
    }

    #[tokio::test]
    async fn test_read_applies_auth_and_config_start() {
        let mock_server = MockServer::start().await;

        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine;
        let expected = format!("Basic {}", BASE64.encode("id:tok"));

        Mock::given(method("GET"))
            .and(path("/calls"))
            .and(header("Authorization", expected.as_str()))
            .and(wiremock::matchers::query_param("from", "1650000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "calls": [{"id": 1, "started_at": 1650000500}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();
        let catalog = connector.discover(&json!({})).await.unwrap();
        let configured = ConfiguredCatalog::select_all(&catalog);

        let stream = connector
            .read(
                &json!({"api_id": "id", "api_token": "tok", "start_time": 1650000000}),
                &configured,
                None,
            )
            .await
            .unwrap();

        let messages: Vec<_> = stream.collect().await;
        let records: Vec<_> = messages
            .iter()
            .filter(|m| matches!(m, Ok(crate::engine::Message::Record { .. })))
            .collect();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_read_unknown_stream_fails() {
        let mock_server = MockServer::start().await;
        let connector = ApiConnector::from_yaml(&definition_for(&mock_server)).unwrap();

        let configured = ConfiguredCatalog {
            streams: vec![crate::config::ConfiguredStream {
                name: "tags".to_string(),
                sync_mode: SyncMode::FullRefresh,
            }],
        };

        let err = connector
            .read(
                &json!({"api_id": "id", "api_token": "tok"}),
                &configured,
                None,
            )
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::StreamNotFound { stream } if stream == "tags"));
    }

    #[test]
    fn test_coerce_scalar() {
        assert_eq!(coerce_scalar("1650000000"), json!(1650000000));
        assert_eq!(coerce_scalar("1.5"), json!(1.5));
        assert_eq!(
            coerce_scalar("2024-01-01T00:00:00.000Z"),
            json!("2024-01-01T00:00:00.000Z")
        );
    }
}
