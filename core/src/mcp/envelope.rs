//! Uniform invocation request and result envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

/// A request to invoke a named tool with untyped wire arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Name of the tool to invoke
    pub name: String,

    /// Arguments, untyped at the wire boundary
    #[serde(default)]
    pub arguments: JsonMap<String, Value>,
}

impl InvocationRequest {
    pub fn new(name: impl Into<String>, arguments: JsonMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Structured error record carried by a failed invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationError {
    /// Stable error kind: `UnknownTool`, `ValidationError`, `TransportError`,
    /// or a handler-declared domain kind
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    /// Tool the failure is attributed to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Offending argument field for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl InvocationError {
    pub fn unknown_tool(tool: &str) -> Self {
        Self {
            kind: "UnknownTool".to_string(),
            message: format!("Tool '{}' is not registered", tool),
            tool: Some(tool.to_string()),
            field: None,
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: "ValidationError".to_string(),
            message: message.into(),
            tool: None,
            field: Some(field.to_string()),
        }
    }

    pub fn handler(tool: &str, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            tool: Some(tool.to_string()),
            field: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: "TransportError".to_string(),
            message: message.into(),
            tool: None,
            field: None,
        }
    }
}

/// Uniform envelope returned by every invocation.
///
/// Exactly one of `result`/`error` is populated; constructing through
/// [`InvocationResult::ok`] and [`InvocationResult::fail`] keeps it that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<InvocationError>,

    /// Point in time the envelope was produced
    pub timestamp: DateTime<Utc>,
}

impl InvocationResult {
    /// Successful envelope wrapping the handler payload
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed envelope wrapping a structured error
    pub fn fail(error: InvocationError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    pub fn error_kind(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_result_only() {
        let envelope = InvocationResult::ok(json!({"count": 3}));
        assert!(envelope.success);
        assert!(envelope.result.is_some());
        assert!(envelope.error.is_none());

        let wire = serde_json::to_value(&envelope).unwrap();
        assert!(wire.get("error").is_none());
        assert!(wire["timestamp"].is_string());
    }

    #[test]
    fn failure_envelope_has_error_only() {
        let envelope = InvocationResult::fail(InvocationError::unknown_tool("ghost"));
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error_kind(), Some("UnknownTool"));

        let wire = serde_json::to_value(&envelope).unwrap();
        assert!(wire.get("result").is_none());
        assert_eq!(wire["error"]["type"], "UnknownTool");
        assert_eq!(wire["error"]["tool"], "ghost");
    }

    #[test]
    fn request_tolerates_absent_arguments() {
        let request: InvocationRequest =
            serde_json::from_value(json!({"name": "get_ticket"})).unwrap();
        assert_eq!(request.name, "get_ticket");
        assert!(request.arguments.is_empty());
    }
}
