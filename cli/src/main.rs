//! # ticket-mcp CLI
//!
//! Command-line interface for ticket-mcp.
//!
//! ## Usage
//!
//! - `ticket-mcp serve` - Run the MCP ticketing server
//! - `ticket-mcp tools` - Discover and print the server's tools
//! - `ticket-mcp call <tool> --args '{...}'` - Invoke one tool
//! - `ticket-mcp chat` - Interactive LLM chat with tool calling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ticket_mcp_core::Settings;

mod commands;

use commands::{call_command, chat_command, serve_command, tools_command};

/// ticket-mcp - a ticketing system behind an MCP tool-calling contract
#[derive(Parser)]
#[command(name = "ticket-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP ticketing server, tool client, and LLM chat loop")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MCP server URL override (client-side commands)
    #[arg(long)]
    url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP ticketing server
    Serve {
        /// Bind host override
        #[arg(long)]
        host: Option<String>,

        /// Port override
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed the store with demo tickets
        #[arg(long)]
        seed: bool,
    },

    /// Discover and print the server's tools
    Tools {
        /// Bypass the discovery cache
        #[arg(long)]
        refresh: bool,
    },

    /// Invoke one tool with JSON arguments
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Interactive chat backed by the configured LLM
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        settings.client.server_url = url;
    }

    match cli.command {
        Commands::Serve { host, port, seed } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            serve_command(settings, seed).await
        }
        Commands::Tools { refresh } => tools_command(settings, refresh).await,
        Commands::Call { tool, args } => call_command(settings, tool, args).await,
        Commands::Chat => chat_command(settings).await,
    }
}
