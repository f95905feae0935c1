//! Built-in connector definitions embedded in the binary
//!
//! Embeds the supported connector YAML files directly into the binary, so
//! users can say `--connector aircall` instead of a file path.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in connector YAML definitions
pub static BUILTIN_CONNECTORS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Telephony
        m.insert("aircall", include_str!("../connectors/aircall.yaml"));

        // Call intelligence
        m.insert("modjo", include_str!("../connectors/modjo.yaml"));

        m
    });

/// Get a built-in connector by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_CONNECTORS.get(name).copied()
}

/// Check if a connector name is a built-in connector
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_CONNECTORS.contains_key(name)
}

/// List all built-in connector names
pub fn list_builtin() -> Vec<&'static str> {
    vec!["aircall", "modjo"]
}

/// Connector metadata for display
#[derive(Debug, Clone)]
pub struct ConnectorInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub config_schema: &'static [ConfigField],
    pub streams: &'static [&'static str],
}

/// Configuration field definition
#[derive(Debug, Clone)]
pub struct ConfigField {
    pub name: &'static str,
    pub field_type: &'static str,
    pub required: bool,
    pub secret: bool,
    pub description: &'static str,
}

/// Get detailed info about all built-in connectors
pub fn list_builtin_info() -> Vec<ConnectorInfo> {
    vec![
        ConnectorInfo {
            name: "aircall",
            description: "Aircall call records with incremental sync",
            category: "Telephony",
            config_schema: &[
                ConfigField {
                    name: "api_id",
                    field_type: "string",
                    required: true,
                    secret: true,
                    description: "Aircall API id",
                },
                ConfigField {
                    name: "api_token",
                    field_type: "string",
                    required: true,
                    secret: true,
                    description: "Aircall API token",
                },
                ConfigField {
                    name: "start_time",
                    field_type: "integer",
                    required: false,
                    secret: false,
                    description: "Initial watermark as a unix timestamp in seconds (default 0)",
                },
            ],
            streams: &["calls"],
        },
        ConnectorInfo {
            name: "modjo",
            description: "Modjo call intelligence records, tags, and topics",
            category: "Call Intelligence",
            config_schema: &[
                ConfigField {
                    name: "email",
                    field_type: "string",
                    required: true,
                    secret: false,
                    description: "Modjo account email",
                },
                ConfigField {
                    name: "password",
                    field_type: "string",
                    required: true,
                    secret: true,
                    description: "Modjo account password",
                },
                ConfigField {
                    name: "start_date",
                    field_type: "string",
                    required: false,
                    secret: false,
                    description: "Initial watermark as an ISO-8601 timestamp",
                },
            ],
            streams: &["calls", "tags", "topics"],
        },
    ]
}
