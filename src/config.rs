//! Runtime configuration handling and catalog types
//!
//! User-supplied configuration arrives as a JSON mapping from the host. This
//! module validates it against a connector's declared spec properties and
//! defines the catalog types exchanged with the host.

use crate::error::{Error, Result};
use crate::types::{PropertyType, SyncMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Spec Config (for UI/validation)
// ============================================================================

/// Configuration specification for connector setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    #[serde(default)]
    pub properties: HashMap<String, PropertyConfig>,
}

/// Configuration property definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    /// Property description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Default value
    #[serde(default)]
    pub default: Option<Value>,
}

/// Validate a user config mapping against the declared spec properties.
///
/// Required fields must be present and non-null; a present field must match
/// the declared property type. Fails before any network call is attempted.
pub fn validate_config(spec: &SpecConfig, config: &Value) -> Result<()> {
    let obj = match config {
        Value::Object(map) => map,
        Value::Null => {
            if spec.properties.values().any(|p| p.required) {
                return Err(Error::config("config must be a JSON object"));
            }
            return Ok(());
        }
        _ => return Err(Error::config("config must be a JSON object")),
    };

    for (name, prop) in &spec.properties {
        match obj.get(name) {
            None | Some(Value::Null) => {
                if prop.required {
                    return Err(Error::missing_field(name));
                }
            }
            Some(value) => check_property_type(name, prop, value)?,
        }
    }

    Ok(())
}

fn check_property_type(name: &str, prop: &PropertyConfig, value: &Value) -> Result<()> {
    let ok = match prop.property_type {
        PropertyType::String => value.is_string(),
        PropertyType::Integer => value.is_i64() || value.is_u64(),
        PropertyType::Number => value.is_number(),
        PropertyType::Boolean => value.is_boolean(),
    };

    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfigValue {
            field: name.to_string(),
            message: format!("expected {:?}", prop.property_type),
        })
    }
}

/// Get a required string field from a config mapping
pub fn require_str<'a>(config: &'a Value, field: &str) -> Result<&'a str> {
    config
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::missing_field(field))
}

/// Get an optional field from a config mapping, treating null as absent
pub fn optional<'a>(config: &'a Value, field: &str) -> Option<&'a Value> {
    config.get(field).filter(|v| !v.is_null())
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Look up a stream by name
    pub fn get_stream(&self, name: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.name == name)
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Option<String>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<String>>,
}

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    /// Select every stream of a discovered catalog with its preferred mode
    pub fn select_all(catalog: &Catalog) -> Self {
        let streams = catalog
            .streams
            .iter()
            .map(|s| ConfiguredStream {
                name: s.name.clone(),
                sync_mode: if s.supported_sync_modes.contains(&SyncMode::Incremental) {
                    SyncMode::Incremental
                } else {
                    SyncMode::FullRefresh
                },
            })
            .collect();
        Self { streams }
    }
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream name
    pub name: String,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> SpecConfig {
        let mut properties = HashMap::new();
        properties.insert(
            "api_id".to_string(),
            PropertyConfig {
                required: true,
                secret: true,
                ..Default::default()
            },
        );
        properties.insert(
            "start_time".to_string(),
            PropertyConfig {
                property_type: PropertyType::Integer,
                ..Default::default()
            },
        );
        SpecConfig { properties }
    }

    #[test]
    fn test_validate_config_ok() {
        let config = json!({"api_id": "abc", "start_time": 1650000000});
        assert!(validate_config(&spec(), &config).is_ok());
    }

    #[test]
    fn test_validate_config_missing_required() {
        let config = json!({"start_time": 0});
        let err = validate_config(&spec(), &config).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingConfigField { field } if field == "api_id"
        ));
    }

    #[test]
    fn test_validate_config_null_is_missing() {
        let config = json!({"api_id": null});
        assert!(validate_config(&spec(), &config).is_err());
    }

    #[test]
    fn test_validate_config_wrong_type() {
        let config = json!({"api_id": "abc", "start_time": "yesterday"});
        let err = validate_config(&spec(), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_require_str() {
        let config = json!({"email": "a@b.co", "empty": ""});
        assert_eq!(require_str(&config, "email").unwrap(), "a@b.co");
        assert!(require_str(&config, "empty").is_err());
        assert!(require_str(&config, "missing").is_err());
    }

    #[test]
    fn test_select_all_prefers_incremental() {
        let catalog = Catalog {
            streams: vec![
                CatalogStream {
                    name: "calls".to_string(),
                    supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
                    default_cursor_field: Some("started_at".to_string()),
                    source_defined_primary_key: Some(vec!["id".to_string()]),
                },
                CatalogStream {
                    name: "tags".to_string(),
                    supported_sync_modes: vec![SyncMode::FullRefresh],
                    default_cursor_field: None,
                    source_defined_primary_key: Some(vec!["id".to_string()]),
                },
            ],
        };

        let configured = ConfiguredCatalog::select_all(&catalog);
        assert_eq!(configured.streams[0].sync_mode, SyncMode::Incremental);
        assert_eq!(configured.streams[1].sync_mode, SyncMode::FullRefresh);
    }
}
