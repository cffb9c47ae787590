//! Tool executor: validate, dispatch, and wrap every outcome in the envelope

use crate::mcp::envelope::{InvocationError, InvocationRequest, InvocationResult};
use crate::mcp::registry::ToolRegistry;
use crate::mcp::schema::{ArgumentPolicy, ToolDescriptor};
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;
use std::time::Instant;

/// Executes tool invocations against a registry.
///
/// `execute` never propagates a fault to the caller: unknown tools,
/// validation failures, and handler errors all come back as a failed
/// [`InvocationResult`]. The executor itself is stateless per call.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    policy: ArgumentPolicy,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            policy: ArgumentPolicy::default(),
        }
    }

    /// Set the policy for argument fields not present in the schema
    pub fn with_policy(mut self, policy: ArgumentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Pure projection of the registry for discovery responses
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.registry.list()
    }

    /// Execute a named tool against raw wire arguments
    pub async fn execute(
        &self,
        tool_name: &str,
        raw_arguments: JsonMap<String, Value>,
    ) -> InvocationResult {
        let started = Instant::now();

        let tool = match self.registry.get(tool_name) {
            Ok(tool) => tool,
            Err(_) => {
                tracing::warn!(tool = %tool_name, "invocation of unregistered tool");
                return InvocationResult::fail(InvocationError::unknown_tool(tool_name));
            }
        };

        let arguments = match tool.descriptor.validate_arguments(raw_arguments, self.policy) {
            Ok(arguments) => arguments,
            Err(error) => {
                tracing::debug!(tool = %tool_name, field = ?error.field, "argument validation failed");
                return InvocationResult::fail(error);
            }
        };

        let result = match tool.handler.call(arguments).await {
            Ok(payload) => InvocationResult::ok(payload),
            Err(error) => InvocationResult::fail(InvocationError::handler(
                tool_name,
                error.kind,
                error.message,
            )),
        };

        tracing::debug!(
            tool = %tool_name,
            success = result.success,
            duration_ms = started.elapsed().as_millis() as u64,
            "tool executed"
        );
        result
    }

    /// Execute a decoded wire request
    pub async fn execute_request(&self, request: InvocationRequest) -> InvocationResult {
        self.execute(&request.name, request.arguments).await
    }
}
