//! Tool registry binding descriptors to their handlers

use crate::error::{HandlerError, ToolError};
use crate::mcp::schema::ToolDescriptor;
use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Async callable bound to exactly one tool descriptor.
///
/// Handlers receive arguments already validated and coerced against the
/// descriptor's schema and return a structured payload, or a [`HandlerError`]
/// whose kind surfaces verbatim in the result envelope.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(
        &self,
        arguments: JsonMap<String, Value>,
    ) -> std::result::Result<Value, HandlerError>;
}

/// Wrap an async function or closure as a [`ToolHandler`]
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(JsonMap<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, HandlerError>> + Send + 'static,
{
    struct FnHandler<F>(F);

    #[async_trait]
    impl<F, Fut> ToolHandler for FnHandler<F>
    where
        F: Fn(JsonMap<String, Value>) -> Fut + Send + Sync,
        Fut: Future<Output = std::result::Result<Value, HandlerError>> + Send,
    {
        async fn call(
            &self,
            arguments: JsonMap<String, Value>,
        ) -> std::result::Result<Value, HandlerError> {
            (self.0)(arguments).await
        }
    }

    Arc::new(FnHandler(f))
}

/// One registered tool: descriptor plus its bound handler
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("descriptor", &self.descriptor)
            .field("handler", &"<handler>")
            .finish()
    }
}

/// Registry owning every tool descriptor/handler pair for a server process.
///
/// Registration happens once at startup, before concurrent invocation
/// traffic begins; the steady-state read path takes no lock. `list()` returns
/// descriptors in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already present.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> std::result::Result<(), ToolError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::Duplicate {
                name: descriptor.name.clone(),
            });
        }
        self.index
            .insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> std::result::Result<&RegisteredTool, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::NotFound {
                name: name.to_string(),
            })
    }

    /// All descriptors, in registration order
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.descriptor.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
