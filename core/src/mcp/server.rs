//! Axum-based HTTP server exposing the registry and executor.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/mcp/info` | Server name, version, capabilities, and tool list. |
//! | `GET`  | `/mcp/tools` | Discovery: the registered tool descriptors. |
//! | `POST` | `/mcp/call_tool` | Execute one invocation request. |
//! | `GET`  | `/mcp/health` | Liveness check with the registered tool count. |
//!
//! Access control is an external concern; the core serves every caller.

use crate::error::Result;
use crate::mcp::envelope::{InvocationRequest, InvocationResult};
use crate::mcp::executor::ToolExecutor;
use crate::mcp::schema::ToolDescriptor;
use crate::mcp::transport::ToolListResponse;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Runtime configuration for [`McpServer`]
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Bind host (default: 127.0.0.1)
    pub host: String,
    /// TCP port to listen on (default: 8000)
    pub port: u16,
    /// Server name advertised on `/mcp/info`
    pub name: String,
    /// Human-readable description advertised on `/mcp/info`
    pub description: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            name: "ticket-mcp".to_string(),
            description: "Ticketing system exposed over the MCP tool-calling contract"
                .to_string(),
        }
    }
}

/// Server identity and capabilities, as served on `/mcp/info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub tools: Vec<ToolDescriptor>,
}

/// Shared state injected into every handler via [`State`]
#[derive(Clone)]
struct AppState {
    executor: Arc<ToolExecutor>,
    config: McpServerConfig,
}

/// HTTP server wrapping a [`ToolExecutor`]
pub struct McpServer {
    config: McpServerConfig,
    executor: Arc<ToolExecutor>,
}

impl McpServer {
    pub fn new(config: McpServerConfig, executor: Arc<ToolExecutor>) -> Self {
        Self { config, executor }
    }

    /// Build the axum [`Router`]; call [`serve`](Self::serve) to bind and run
    pub fn build_app(&self) -> Router {
        let state = AppState {
            executor: self.executor.clone(),
            config: self.config.clone(),
        };

        Router::new()
            .route("/mcp/info", get(info_handler))
            .route("/mcp/tools", get(list_tools_handler))
            .route("/mcp/call_tool", post(call_tool_handler))
            .route("/mcp/health", get(health_handler))
            .with_state(state)
    }

    /// Bind the configured address and serve until shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(
            addr = %addr,
            tools = self.executor.registry().len(),
            "MCP server listening"
        );
        axum::serve(listener, self.build_app()).await?;
        Ok(())
    }
}

async fn info_handler(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(ServerInfo {
        name: state.config.name.clone(),
        version: crate::VERSION.to_string(),
        description: state.config.description.clone(),
        capabilities: vec!["tools".to_string()],
        tools: state.executor.describe(),
    })
}

async fn list_tools_handler(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.executor.describe(),
    })
}

async fn call_tool_handler(
    State(state): State<AppState>,
    Json(request): Json<InvocationRequest>,
) -> Json<InvocationResult> {
    Json(state.executor.execute_request(request).await)
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "server_name": state.config.name,
        "version": crate::VERSION,
        "tool_count": state.executor.registry().len(),
    }))
}
