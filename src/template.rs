//! Template interpolation for connector definitions
//!
//! Handles `{{ variable }}` interpolation in connector YAML values.
//! Supports nested access like `{{ config.api_token }}` and, for detail
//! enrichment paths, `{{ record.id }}`.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Connector configuration values
    pub config: Value,
    /// Current record (for per-record detail paths)
    pub record: Value,
    /// Additional context variables
    pub vars: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with config values
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set config values
    pub fn set_config(&mut self, config: Value) -> &mut Self {
        self.config = config;
        self
    }

    /// Set the current record
    pub fn set_record(&mut self, record: Value) -> &mut Self {
        self.record = record;
        self
    }

    /// Set additional variables
    pub fn set_vars(&mut self, vars: Value) -> &mut Self {
        self.vars = vars;
        self
    }

    /// Get a value by path (e.g., "config.api_token")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.is_empty() {
            return None;
        }

        // First part determines the root object
        let root = match parts[0] {
            "config" => &self.config,
            "record" => &self.record,
            "vars" => &self.vars,
            // Also support top-level access to config fields directly
            _ => {
                if let Some(val) = get_nested_value(&self.config, &parts) {
                    return Some(val);
                }
                return get_nested_value(&self.vars, &parts);
            }
        };

        if parts.len() == 1 {
            Some(root)
        } else {
            get_nested_value(root, &parts[1..])
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = template.to_string();
    let mut errors = Vec::new();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let full_match = cap.get(0).unwrap().as_str();
        let var_path = cap.get(1).unwrap().as_str();

        match ctx.get(var_path) {
            Some(value) => {
                let replacement = value_to_string(value);
                result = result.replace(full_match, &replacement);
            }
            None => {
                errors.push(var_path.to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Render a template, substituting empty strings for undefined variables.
///
/// Used for optional config bindings (e.g. a start watermark the user may
/// omit): the caller treats an empty result as "not provided".
pub fn render_optional(template: &str, ctx: &TemplateContext) -> String {
    let mut result = template.to_string();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let full_match = cap.get(0).unwrap().as_str();
        let var_path = cap.get(1).unwrap().as_str();

        let replacement = ctx.get(var_path).map(value_to_string).unwrap_or_default();
        result = result.replace(full_match, &replacement);
    }

    result
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_substitution() {
        let ctx = TemplateContext::with_config(json!({
            "api_token": "tok_123"
        }));

        let result = render("Bearer {{ config.api_token }}", &ctx).unwrap();
        assert_eq!(result, "Bearer tok_123");
    }

    #[test]
    fn test_multiple_substitutions() {
        let ctx = TemplateContext::with_config(json!({
            "host": "api.example.com",
            "version": "v1"
        }));

        let result = render("https://{{ config.host }}/{{ config.version }}/calls", &ctx).unwrap();
        assert_eq!(result, "https://api.example.com/v1/calls");
    }

    #[test]
    fn test_record_context() {
        let mut ctx = TemplateContext::new();
        ctx.set_record(json!({"id": 981}));

        let result = render("call-details/{{ record.id }}", &ctx).unwrap();
        assert_eq!(result, "call-details/981");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::new();
        let result = render("{{ config.missing }}", &ctx);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("config.missing"));
    }

    #[test]
    fn test_no_templates() {
        let ctx = TemplateContext::new();
        let result = render("plain string without templates", &ctx).unwrap();
        assert_eq!(result, "plain string without templates");
    }

    #[test]
    fn test_has_templates() {
        assert!(has_templates("{{ config.key }}"));
        assert!(has_templates("prefix {{ var }} suffix"));
        assert!(!has_templates("no templates here"));
        assert!(!has_templates("{ not a template }"));
    }

    #[test]
    fn test_number_substitution() {
        let ctx = TemplateContext::with_config(json!({
            "start_time": 1650000000
        }));

        let result = render("from={{ config.start_time }}", &ctx).unwrap();
        assert_eq!(result, "from=1650000000");
    }

    #[test]
    fn test_whitespace_in_template() {
        let ctx = TemplateContext::with_config(json!({"key": "value"}));

        assert_eq!(render("{{config.key}}", &ctx).unwrap(), "value");
        assert_eq!(render("{{ config.key }}", &ctx).unwrap(), "value");
        assert_eq!(render("{{  config.key  }}", &ctx).unwrap(), "value");
    }

    #[test]
    fn test_render_optional() {
        let ctx = TemplateContext::with_config(json!({"key": "value"}));

        assert_eq!(render_optional("test {{ config.key }}", &ctx), "test value");

        // Undefined variable renders as empty
        assert_eq!(render_optional("{{ config.missing }}", &ctx), "");
    }
}
