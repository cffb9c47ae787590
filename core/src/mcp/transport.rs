//! Transport seam between the invocation client and a remote MCP server

use crate::error::TransportError;
use crate::mcp::envelope::{InvocationRequest, InvocationResult};
use crate::mcp::schema::ToolDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Wire shape of the discovery response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDescriptor>,
}

/// Transport over which discovery and invocation travel.
///
/// The production implementation is [`HttpTransport`]; the trait exists so
/// tests and in-process embeddings can bypass the network.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Fetch the server's current tool list
    async fn fetch_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, TransportError>;

    /// Send one invocation request and decode the result envelope
    async fn call_tool(
        &self,
        request: InvocationRequest,
    ) -> std::result::Result<InvocationResult, TransportError>;
}

/// HTTP+JSON transport speaking to the axum discovery/invocation endpoints
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Use a preconfigured reqwest client (custom timeouts, proxies, ...)
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Connect {
                message: format!("Invalid endpoint URL '{}': {}", path, e),
            })
    }
}

#[async_trait]
impl McpTransport for HttpTransport {
    async fn fetch_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, TransportError> {
        let url = self.endpoint("/mcp/tools")?;
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<ToolListResponse>()
            .await?;

        tracing::debug!(count = response.tools.len(), "fetched tool list");
        Ok(response.tools)
    }

    async fn call_tool(
        &self,
        request: InvocationRequest,
    ) -> std::result::Result<InvocationResult, TransportError> {
        let url = self.endpoint("/mcp/call_tool")?;
        let result = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<InvocationResult>()
            .await?;

        Ok(result)
    }
}
