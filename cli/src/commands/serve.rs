//! `serve` command: run the MCP ticketing server

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use ticket_mcp_core::{ticket_registry, McpServer, Settings, TicketStore, ToolExecutor};

pub async fn serve_command(settings: Settings, seed: bool) -> Result<()> {
    let store = Arc::new(TicketStore::new());
    if seed {
        let created = store.seed_demo();
        println!("{} seeded {} demo tickets", "✓".green(), created);
    }

    let registry = ticket_registry(store)?;
    println!(
        "{} serving {} tools on http://{}:{}",
        "✓".green(),
        registry.len(),
        settings.server.host,
        settings.server.port
    );

    let executor =
        Arc::new(ToolExecutor::new(Arc::new(registry)).with_policy(settings.argument_policy()));
    let server = McpServer::new(settings.server_config(), executor);
    server.serve().await?;
    Ok(())
}
