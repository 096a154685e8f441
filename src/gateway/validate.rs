//! Argument validation and coercion
//!
//! [`validate`] checks a raw `arguments` payload against a [`ToolSchema`] and
//! produces [`Arguments`] holding exactly the declared parameters, coerced to
//! their declared types. Undeclared keys are dropped.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::gateway::schema::{ParamType, ParameterSpec, ToolSchema};

/// Validated, normalized arguments handed to a tool handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// String argument, empty when absent
    pub fn str_or_empty(&self, name: &str) -> &str {
        self.str(name).unwrap_or_default()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    /// Array argument as strings, empty when absent. Non-string items are
    /// rendered with their JSON text.
    pub fn str_list(&self, name: &str) -> Vec<String> {
        match self.0.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Validate raw arguments against a schema
pub fn validate(schema: &ToolSchema, arguments: &Value) -> Result<Arguments, ValidationError> {
    let empty = Map::new();
    let raw = match arguments {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => return Err(ValidationError::NotAnObject),
    };

    let mut normalized = Map::new();

    for spec in &schema.params {
        match raw.get(&spec.name).filter(|v| is_present(v, spec)) {
            Some(value) => {
                let coerced = coerce(value, spec.param_type).ok_or_else(|| {
                    ValidationError::TypeMismatch {
                        name: spec.name.clone(),
                        expected: spec.param_type,
                    }
                })?;
                if !spec.allowed.is_empty() {
                    let text = coerced.as_str().unwrap_or_default();
                    if !spec.allowed.iter().any(|a| a == text) {
                        return Err(ValidationError::UnsupportedValue {
                            name: spec.name.clone(),
                            value: text.to_string(),
                        });
                    }
                }
                normalized.insert(spec.name.clone(), coerced);
            }
            None if spec.is_required() => {
                return Err(ValidationError::MissingArgument {
                    name: spec.name.clone(),
                });
            }
            None => {
                if let Some(default) = spec.default_value() {
                    normalized.insert(spec.name.clone(), default.clone());
                }
            }
        }
    }

    Ok(Arguments(normalized))
}

/// `null` is always absent; a blank string is absent for a required string
fn is_present(value: &Value, spec: &ParameterSpec) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) if spec.is_required() && spec.param_type == ParamType::String => {
            !s.trim().is_empty()
        }
        _ => true,
    }
}

/// Coerce a JSON value to the declared type, if possible
fn coerce(value: &Value, param_type: ParamType) -> Option<Value> {
    match (param_type, value) {
        (ParamType::String, Value::String(_)) => Some(value.clone()),
        (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ParamType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

        (ParamType::Integer, Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Some(Value::from(i))
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| Value::from(f as i64))
            }
        }
        (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),

        (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ParamType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },

        (ParamType::Array, Value::Array(_)) => Some(value.clone()),
        (ParamType::Array, Value::String(_)) => Some(Value::Array(vec![value.clone()])),

        _ => None,
    }
}
