//! Example demonstrating the full tool-calling round trip in one process:
//! a ticketing MCP server on an ephemeral port, discovery through the
//! invocation client, function adapters, and the uniform result envelope.

use serde_json::json;
use std::sync::Arc;
use ticket_mcp_core::mcp::HttpTransport;
use ticket_mcp_core::{ticket_registry, McpClient, McpServer, McpServerConfig, TicketStore, ToolExecutor};
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ticket-mcp Loopback Example ===\n");

    // Server side: a seeded store, the ticket tool registry, and the
    // executor behind the HTTP endpoints
    let store = Arc::new(TicketStore::new());
    let seeded = store.seed_demo();
    println!("✓ Seeded {} demo tickets", seeded);

    let registry = ticket_registry(store)?;
    let executor = Arc::new(ToolExecutor::new(Arc::new(registry)));
    let server = McpServer::new(McpServerConfig::default(), executor);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = server.build_app();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    println!("✓ MCP server listening on http://{}\n", addr);

    // Client side: discover the tools and wrap them as function adapters
    let base_url = Url::parse(&format!("http://{}", addr))?;
    let client = Arc::new(McpClient::new(Arc::new(HttpTransport::new(base_url))));

    let functions = client.clone().functions(false).await?;
    println!("Discovered {} tools:", functions.len());
    for function in &functions {
        println!("  · {} - {}", function.name(), function.description());
    }

    // Invoke through an adapter, exactly as an LLM function-calling loop would
    println!("\n1. Searching for network tickets:");
    let search = functions
        .iter()
        .find(|f| f.name() == "search_tickets")
        .expect("search_tickets is registered");
    let result = search
        .invoke(
            json!({"query": "network", "limit": 5})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    // Failures come back in the same envelope, never as a raised fault
    println!("\n2. Creating a ticket with a missing required field:");
    let invalid = client
        .invoke_value("create_ticket", json!({"title": "Broken keyboard"}))
        .await;
    println!("{}", serde_json::to_string_pretty(&invalid)?);

    println!("\n3. Aggregate analytics:");
    let analytics = client.invoke_value("get_ticket_analytics", json!({})).await;
    println!("{}", serde_json::to_string_pretty(&analytics)?);

    Ok(())
}
