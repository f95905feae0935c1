//! Detail-endpoint enrichment
//!
//! Augments a list-endpoint record with fields only available from a per-id
//! detail endpoint. Enrichment is fail-fast: a failing detail fetch aborts
//! the whole stream rather than yielding a partially-enriched record.

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::template::{self, TemplateContext};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// A single enrichment step applied to each record before it is emitted
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Merge additional fields into the record, or fail the stream
    async fn enrich(&self, client: &HttpClient, record: &mut Value) -> Result<()>;
}

/// Enricher that issues one GET per record against a detail endpoint.
///
/// The path template is rendered with the record in scope
/// (`call-details/{{ record.id }}`); the named subset of detail fields is
/// merged into the record, overwriting same-named base fields. A named field
/// absent from the detail payload merges as JSON null so the record shape
/// stays stable.
#[derive(Debug, Clone)]
pub struct DetailEnricher {
    /// Path template for the detail endpoint
    pub path_template: String,
    /// Fields copied from the detail payload into the record
    pub fields: Vec<String>,
    /// Record field carrying the primary id (for diagnostics)
    pub id_field: String,
}

impl DetailEnricher {
    /// Create a new detail enricher
    pub fn new(path_template: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            path_template: path_template.into(),
            fields,
            id_field: "id".to_string(),
        }
    }

    /// Set the record field carrying the primary id
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    fn record_id(&self, record: &Value) -> String {
        record
            .get(&self.id_field)
            .and_then(crate::pagination::value_to_param)
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}

#[async_trait]
impl Enricher for DetailEnricher {
    async fn enrich(&self, client: &HttpClient, record: &mut Value) -> Result<()> {
        let id = self.record_id(record);

        let mut ctx = TemplateContext::new();
        ctx.set_record(record.clone());
        let path = template::render(&self.path_template, &ctx)?;

        debug!("fetching detail record from {path}");

        let response = match client.get(&path).await {
            Ok(response) => response,
            // A rejected detail fetch is a stream-aborting failure, not a
            // transport fault the caller might retry around.
            Err(Error::HttpStatus { status, body }) => {
                return Err(Error::detail_fetch(id, status, body));
            }
            Err(e) => return Err(e),
        };

        let details: Value = response.json().await.map_err(Error::Http)?;

        let Some(target) = record.as_object_mut() else {
            return Err(Error::record_extraction(
                &self.id_field,
                "record is not an object",
            ));
        };

        for field in &self.fields {
            let value = details.get(field).cloned().unwrap_or(Value::Null);
            target.insert(field.clone(), value);
        }

        Ok(())
    }
}
