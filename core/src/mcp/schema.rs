//! Tool descriptors and input schema validation

use crate::mcp::envelope::InvocationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

/// Primitive type tag for a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        }
    }
}

/// Schema for a single tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: ParameterType,

    pub description: String,

    /// Allowed values for enum-of-string parameters
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Element schema for array parameters, e.g. `{"type": "string"}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,

    /// Value filled in when an optional parameter is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterSpec {
    pub fn new(param_type: ParameterType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            description: description.into(),
            enum_values: None,
            items: None,
            default: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParameterType::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(ParameterType::Integer, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(ParameterType::Boolean, description)
    }

    /// String parameter constrained to a fixed set of values
    pub fn enumeration<S: Into<String>>(
        description: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut spec = Self::new(ParameterType::String, description);
        spec.enum_values = Some(values.into_iter().map(Into::into).collect());
        spec
    }

    /// Array parameter with the given element schema
    pub fn array(description: impl Into<String>, items: Value) -> Self {
        let mut spec = Self::new(ParameterType::Array, description);
        spec.items = Some(items);
        spec
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// JSON-Schema-like input specification for one tool.
///
/// Property order is declaration order; `IndexMap` keeps it stable through
/// serialization so discovery output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,

    pub properties: IndexMap<String, ParameterSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable description of one callable tool: unique name, human/LLM-readable
/// description, and the input schema its arguments are validated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::new(),
        }
    }

    /// Add a required parameter
    pub fn required(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        let name = name.into();
        self.input_schema.required.push(name.clone());
        self.input_schema.properties.insert(name, spec);
        self
    }

    /// Add an optional parameter
    pub fn optional(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.input_schema.properties.insert(name.into(), spec);
        self
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.input_schema.required.iter().any(|f| f == field)
    }

    /// Validate raw wire arguments against the schema.
    ///
    /// Returns the validated mapping with coerced values and defaults filled
    /// in, or the `ValidationError` naming the first offending field.
    /// Properties are checked in declaration order.
    pub fn validate_arguments(
        &self,
        raw: JsonMap<String, Value>,
        policy: ArgumentPolicy,
    ) -> std::result::Result<JsonMap<String, Value>, InvocationError> {
        let mut validated = JsonMap::new();

        for (field, spec) in &self.input_schema.properties {
            match raw.get(field) {
                Some(value) if !value.is_null() => {
                    let coerced = coerce(value, spec)
                        .map_err(|message| InvocationError::validation(field, message))?;
                    validated.insert(field.clone(), coerced);
                }
                _ => {
                    if self.is_required(field) {
                        return Err(InvocationError::validation(
                            field,
                            format!("Missing required field: {}", field),
                        ));
                    }
                    if let Some(default) = &spec.default {
                        validated.insert(field.clone(), default.clone());
                    }
                }
            }
        }

        for field in raw.keys() {
            if !self.input_schema.properties.contains_key(field) {
                match policy {
                    ArgumentPolicy::Reject => {
                        return Err(InvocationError::validation(
                            field,
                            format!("Unknown field: {}", field),
                        ));
                    }
                    ArgumentPolicy::Drop => {
                        tracing::warn!(tool = %self.name, field = %field, "dropping unknown argument field");
                    }
                }
            }
        }

        Ok(validated)
    }
}

/// Policy for argument fields not present in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentPolicy {
    /// Drop unknown fields with a warning
    #[default]
    Drop,
    /// Reject the whole invocation on any unknown field
    Reject,
}

/// Coerce one value to the declared parameter type.
///
/// String renderings of scalars are accepted (LLM callers routinely quote
/// integers and booleans); everything else must already be the right JSON
/// type.
fn coerce(value: &Value, spec: &ParameterSpec) -> std::result::Result<Value, String> {
    match spec.param_type {
        ParameterType::String => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("Expected a string, got {}", type_name(value)))?;
            if let Some(allowed) = &spec.enum_values {
                return check_enum(text, allowed);
            }
            Ok(Value::String(text.to_string()))
        }
        ParameterType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(n) => {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 {
                    Ok(Value::from(f as i64))
                } else {
                    Err(format!("Expected an integer, got {}", n))
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("Expected an integer, got \"{}\"", s)),
            other => Err(format!("Expected an integer, got {}", type_name(other))),
        },
        ParameterType::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| format!("Expected a number, got \"{}\"", s)),
            other => Err(format!("Expected a number, got {}", type_name(other))),
        },
        ParameterType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(format!("Expected a boolean, got \"{}\"", s)),
            },
            other => Err(format!("Expected a boolean, got {}", type_name(other))),
        },
        ParameterType::Array => {
            let elements = value
                .as_array()
                .ok_or_else(|| format!("Expected an array, got {}", type_name(value)))?;
            let item_spec = spec.items.as_ref();
            let item_type = item_spec.and_then(|i| i.get("type")).and_then(Value::as_str);
            let item_enum = item_spec.and_then(|i| i.get("enum")).and_then(Value::as_array);

            let mut coerced = Vec::with_capacity(elements.len());
            for element in elements {
                let element = match item_type {
                    Some("string") => {
                        let text = element.as_str().ok_or_else(|| {
                            format!("Expected array of strings, got element {}", type_name(element))
                        })?;
                        if let Some(allowed) = item_enum {
                            let allowed: Vec<String> = allowed
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect();
                            check_enum(text, &allowed)?
                        } else {
                            Value::String(text.to_string())
                        }
                    }
                    Some("integer") => match element {
                        Value::Number(n) if n.is_i64() || n.is_u64() => element.clone(),
                        other => {
                            return Err(format!(
                                "Expected array of integers, got element {}",
                                type_name(other)
                            ))
                        }
                    },
                    _ => element.clone(),
                };
                coerced.push(element);
            }
            Ok(Value::Array(coerced))
        }
        ParameterType::Object => {
            if value.is_object() {
                Ok(value.clone())
            } else {
                Err(format!("Expected an object, got {}", type_name(value)))
            }
        }
    }
}

/// Case-insensitive enum membership; returns the canonical lowercase value
fn check_enum(text: &str, allowed: &[String]) -> std::result::Result<Value, String> {
    let normalized = text.to_ascii_lowercase();
    if allowed.iter().any(|v| *v == normalized) {
        Ok(Value::String(normalized))
    } else {
        Err(format!(
            "Invalid value \"{}\". Must be one of: {}",
            text,
            allowed.join(", ")
        ))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
