//! MCP tool-calling layer: schema registry, executor, discovery endpoint,
//! invocation client, and caller-side function adapters

pub mod adapter;
pub mod client;
pub mod envelope;
pub mod executor;
pub mod registry;
pub mod schema;
pub mod server;
pub mod transport;

pub use adapter::{tool_definitions, ToolFunction};
pub use client::{McpClient, McpClientConfig};
pub use envelope::{InvocationError, InvocationRequest, InvocationResult};
pub use executor::ToolExecutor;
pub use registry::{handler_fn, RegisteredTool, ToolHandler, ToolRegistry};
pub use schema::{ArgumentPolicy, InputSchema, ParameterSpec, ParameterType, ToolDescriptor};
pub use server::{McpServer, McpServerConfig, ServerInfo};
pub use transport::{HttpTransport, McpTransport, ToolListResponse};
