//! YAML parser for connector definitions
//!
//! Parses and validates connector YAML files.
//! Supports both built-in connectors (by name) and custom YAML files (by path).

use crate::connectors;
use crate::error::{Error, Result};
use crate::loader::types::{ConnectorDefinition, PaginationDefinition, StreamDefinition};
use std::fs;
use std::path::Path;
use url::Url;

/// Load a connector definition from a name or file path.
///
/// Checks built-in connector names first (e.g. "aircall"), then falls back
/// to loading from a file path.
pub fn load_connector(path: impl AsRef<Path>) -> Result<ConnectorDefinition> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = connectors::get_builtin(&path_str) {
            return load_connector_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            let builtin_list = connectors::list_builtin().join(", ");
            Error::config(format!(
                "Connector '{}' not found. Built-in connectors: {}. Or provide a path to a YAML file.",
                path.display(),
                builtin_list
            ))
        } else {
            Error::config(format!(
                "Failed to read connector file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_connector_from_str(&content)
}

/// Load a connector definition from a YAML string
pub fn load_connector_from_str(yaml: &str) -> Result<ConnectorDefinition> {
    let def: ConnectorDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse connector YAML: {e}")))?;

    validate_connector(&def)?;
    Ok(def)
}

/// Validate a connector definition
fn validate_connector(def: &ConnectorDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Connector name cannot be empty"));
    }

    Url::parse(&def.base_url)
        .map_err(|e| Error::config(format!("Connector base_url is not a valid URL: {e}")))?;

    if def.streams.is_empty() {
        return Err(Error::config("Connector must have at least one stream"));
    }

    let stream_names: std::collections::HashSet<_> = def.streams.iter().map(|s| &s.name).collect();
    if stream_names.len() != def.streams.len() {
        return Err(Error::config("Duplicate stream names found"));
    }

    for stream in &def.streams {
        validate_stream(stream)?;
    }

    Ok(())
}

/// Validate a stream definition
fn validate_stream(stream: &StreamDefinition) -> Result<()> {
    if stream.name.is_empty() {
        return Err(Error::config("Stream name cannot be empty"));
    }

    if stream.request.path.is_empty() {
        return Err(Error::config(format!(
            "Stream '{}' path cannot be empty",
            stream.name
        )));
    }

    if let Some(PaginationDefinition::ShortPage {
        per_page,
        max_records,
        creation_field,
        ..
    }) = &stream.pagination
    {
        if *per_page == 0 {
            return Err(Error::config(format!(
                "Stream '{}' per_page must be positive",
                stream.name
            )));
        }
        if max_records.is_some() && creation_field.is_none() {
            return Err(Error::config(format!(
                "Stream '{}' sets max_records without creation_field to re-window on",
                stream.name
            )));
        }
    }

    for enrich in &stream.enrich {
        if enrich.fields.is_empty() {
            return Err(Error::config(format!(
                "Stream '{}' enrichment at '{}' names no fields",
                stream.name, enrich.path
            )));
        }
    }

    Ok(())
}
