//! # ticket-mcp Core
//!
//! Core library for ticket-mcp: an MCP-style tool-calling layer wiring a
//! ticketing backend and an LLM function-calling caller through a uniform
//! invocation contract.
//!
//! A server registers schema-described tools and serves discovery plus
//! invocation over HTTP; a client discovers the tools, wraps them as
//! AI-callable function adapters, and invokes them with structured arguments,
//! always receiving the same success/error envelope.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod tickets;

// Re-export commonly used types
pub use agent::{AgentConfig, ChatAgent};
pub use config::Settings;
pub use error::{Error, Result};
pub use mcp::{
    HttpTransport, InvocationRequest, InvocationResult, McpClient, McpClientConfig, McpServer,
    McpServerConfig, ToolDescriptor, ToolExecutor, ToolRegistry,
};
pub use tickets::{ticket_registry, TicketStore};

/// Current version of the ticket-mcp core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
