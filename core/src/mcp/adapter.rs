//! Caller-side function adapters for discovered tools

use crate::error::TransportError;
use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::mcp::client::McpClient;
use crate::mcp::envelope::InvocationResult;
use crate::mcp::schema::ToolDescriptor;
use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;

/// Callable proxy for one discovered tool.
///
/// Exposes the tool's declared schema to a decision-making caller and
/// delegates invocation to the client. Adapters are immutable snapshots tied
/// to the discovery generation that produced them; an adapter for a tool the
/// server has since dropped fails with an `UnknownTool` envelope from the
/// remote executor.
#[derive(Clone)]
pub struct ToolFunction {
    descriptor: ToolDescriptor,
    client: Arc<McpClient>,
    generation: u64,
}

impl ToolFunction {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Discovery generation this adapter was built from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The tool as an LLM function-calling definition
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.descriptor.name.clone(),
                description: self.descriptor.description.clone(),
                parameters: serde_json::to_value(&self.descriptor.input_schema)
                    .unwrap_or_else(|_| json!({"type": "object"})),
            },
        }
    }

    /// Invoke the tool through the client
    pub async fn invoke(&self, arguments: JsonMap<String, Value>) -> InvocationResult {
        self.client.invoke(&self.descriptor.name, arguments).await
    }
}

impl McpClient {
    /// Build one [`ToolFunction`] per discovered tool.
    ///
    /// Runs discovery first, so adapters always reflect the freshest cached
    /// snapshot; call with `force_refresh` to regenerate after a known
    /// server-side change.
    pub async fn functions(
        self: Arc<Self>,
        force_refresh: bool,
    ) -> std::result::Result<Vec<ToolFunction>, TransportError> {
        let tools = self.discover(force_refresh).await?;
        let generation = self.generation().await.unwrap_or(0);

        Ok(tools
            .iter()
            .cloned()
            .map(|descriptor| ToolFunction {
                descriptor,
                client: self.clone(),
                generation,
            })
            .collect())
    }
}

/// Collect LLM function definitions for a set of adapters
pub fn tool_definitions(functions: &[ToolFunction]) -> Vec<ToolDefinition> {
    functions.iter().map(ToolFunction::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::envelope::InvocationRequest;
    use crate::mcp::executor::ToolExecutor;
    use crate::mcp::registry::{handler_fn, ToolRegistry};
    use crate::mcp::schema::ParameterSpec;
    use crate::mcp::transport::McpTransport;
    use async_trait::async_trait;

    /// Transport wired straight to an executor, with an independently
    /// controlled advertised tool list (to model a server whose registry
    /// drifted after discovery)
    struct LoopbackTransport {
        advertised: Vec<ToolDescriptor>,
        executor: ToolExecutor,
    }

    #[async_trait]
    impl McpTransport for LoopbackTransport {
        async fn fetch_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, TransportError> {
            Ok(self.advertised.clone())
        }

        async fn call_tool(
            &self,
            request: InvocationRequest,
        ) -> std::result::Result<InvocationResult, TransportError> {
            Ok(self.executor.execute_request(request).await)
        }
    }

    fn ping_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDescriptor::new("ping", "Reply with pong")
                    .optional("tag", ParameterSpec::string("Echo tag")),
                handler_fn(|arguments| async move {
                    Ok(json!({"pong": arguments.get("tag").cloned().unwrap_or(Value::Null)}))
                }),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn adapters_mirror_discovered_descriptors() {
        let registry = ping_registry();
        let advertised = registry.list();
        let transport = Arc::new(LoopbackTransport {
            advertised,
            executor: ToolExecutor::new(Arc::new(registry)),
        });
        let client = Arc::new(McpClient::new(transport));

        let functions = client.functions(false).await.unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name(), "ping");
        assert_eq!(functions[0].generation(), 0);

        let definition = functions[0].definition();
        assert_eq!(definition.tool_type, "function");
        assert_eq!(definition.function.name, "ping");
        assert_eq!(
            definition.function.parameters,
            serde_json::to_value(&functions[0].descriptor().input_schema).unwrap()
        );
    }

    #[tokio::test]
    async fn adapter_invocation_flows_through_the_executor() {
        let registry = ping_registry();
        let advertised = registry.list();
        let transport = Arc::new(LoopbackTransport {
            advertised,
            executor: ToolExecutor::new(Arc::new(registry)),
        });
        let client = Arc::new(McpClient::new(transport));

        let functions = client.functions(false).await.unwrap();
        let mut arguments = JsonMap::new();
        arguments.insert("tag".to_string(), json!("hi"));

        let result = functions[0].invoke(arguments).await;
        assert!(result.success);
        assert_eq!(result.result.unwrap(), json!({"pong": "hi"}));
    }

    #[tokio::test]
    async fn stale_adapter_for_removed_tool_fails_with_unknown_tool() {
        // The server advertises a tool its registry no longer carries
        let transport = Arc::new(LoopbackTransport {
            advertised: vec![ToolDescriptor::new("retired", "No longer served")],
            executor: ToolExecutor::new(Arc::new(ToolRegistry::new())),
        });
        let client = Arc::new(McpClient::new(transport));

        let functions = client.functions(false).await.unwrap();
        let result = functions[0].invoke(JsonMap::new()).await;

        assert!(!result.success);
        assert_eq!(result.error_kind(), Some("UnknownTool"));
    }
}
