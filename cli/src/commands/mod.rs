//! CLI command implementations

mod call;
mod chat;
mod serve;
mod tools;

pub use call::call_command;
pub use chat::chat_command;
pub use serve::serve_command;
pub use tools::tools_command;

use anyhow::{Context, Result};
use std::sync::Arc;
use ticket_mcp_core::mcp::HttpTransport;
use ticket_mcp_core::{McpClient, Settings};
use url::Url;

/// Build an invocation client from the settings
pub(crate) fn build_client(settings: &Settings) -> Result<Arc<McpClient>> {
    let base_url = Url::parse(&settings.client.server_url)
        .with_context(|| format!("invalid server URL '{}'", settings.client.server_url))?;
    let transport = Arc::new(HttpTransport::new(base_url));
    Ok(Arc::new(McpClient::with_config(
        transport,
        settings.client_config(),
    )))
}
