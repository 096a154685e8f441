//! Declared tool parameters
//!
//! A [`ToolSchema`] is an ordered list of [`ParameterSpec`]s. It drives argument
//! validation and is rendered as JSON Schema for `tools/list`.

use serde_json::{json, Map, Value};

/// Type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Integer,
    Array,
    Boolean,
}

impl ParamType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Array => "array",
            ParamType::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a parameter must be supplied.
///
/// Only optional parameters can carry a default.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional(Option<Value>),
}

/// A single declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub presence: Presence,
    pub description: String,
    /// Accepted values for string parameters; empty means any
    pub allowed: Vec<String>,
}

impl ParameterSpec {
    /// A parameter the caller must supply
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            presence: Presence::Required,
            description: description.to_string(),
            allowed: Vec::new(),
        }
    }

    /// A parameter that may be left out, with no default
    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            presence: Presence::Optional(None),
            description: description.to_string(),
            allowed: Vec::new(),
        }
    }

    /// An optional parameter that falls back to `default` when absent
    pub fn with_default(
        name: &str,
        param_type: ParamType,
        default: impl Into<Value>,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            presence: Presence::Optional(Some(default.into())),
            description: description.to_string(),
            allowed: Vec::new(),
        }
    }

    /// Restrict a string parameter to a fixed set of values
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    pub fn default_value(&self) -> Option<&Value> {
        match &self.presence {
            Presence::Optional(default) => default.as_ref(),
            Presence::Required => None,
        }
    }
}

/// Ordered parameter list of a tool
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolSchema {
    pub params: Vec<ParameterSpec>,
}

impl ToolSchema {
    pub fn new(params: Vec<ParameterSpec>) -> Self {
        Self { params }
    }

    pub fn param(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Render as a JSON Schema object for MCP clients
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.params {
            let mut prop = json!({
                "type": spec.param_type.as_str(),
                "description": spec.description,
            });
            if spec.param_type == ParamType::Array {
                prop["items"] = json!({"type": "string"});
            }
            if !spec.allowed.is_empty() {
                prop["enum"] = json!(spec.allowed);
            }
            if let Some(default) = spec.default_value() {
                prop["default"] = default.clone();
            }
            if spec.is_required() {
                required.push(Value::String(spec.name.clone()));
            }
            properties.insert(spec.name.clone(), prop);
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_has_no_default() {
        let spec = ParameterSpec::required("to", ParamType::String, "Recipient");
        assert!(spec.is_required());
        assert!(spec.default_value().is_none());

        let spec = ParameterSpec::with_default("max_results", ParamType::Integer, 10, "Limit");
        assert!(!spec.is_required());
        assert_eq!(spec.default_value(), Some(&json!(10)));
    }

    #[test]
    fn test_json_schema() {
        let schema = ToolSchema::new(vec![
            ParameterSpec::required("address", ParamType::String, "Address to geocode"),
            ParameterSpec::with_default("attendees", ParamType::Array, json!([]), "Emails"),
            ParameterSpec::with_default("mode", ParamType::String, "driving", "Mode")
                .one_of(&["driving", "walking"]),
        ]);
        let rendered = schema.to_json_schema();

        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["address"]));
        assert_eq!(rendered["properties"]["address"]["type"], "string");
        assert_eq!(rendered["properties"]["attendees"]["items"]["type"], "string");
        assert_eq!(rendered["properties"]["attendees"]["default"], json!([]));
        assert_eq!(rendered["properties"]["mode"]["enum"], json!(["driving", "walking"]));
    }
}
