//! `call` command: invoke one tool and print the envelope

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use ticket_mcp_core::Settings;

use super::build_client;

pub async fn call_command(settings: Settings, tool: String, args: String) -> Result<()> {
    let arguments: Value =
        serde_json::from_str(&args).context("arguments must be a JSON object")?;

    let client = build_client(&settings)?;
    let result = client.invoke_value(&tool, arguments).await;

    if result.success {
        println!("{} {}", "✓".green(), tool.bold());
    } else {
        let kind = result.error_kind().unwrap_or("Error");
        println!("{} {} ({})", "✗".red(), tool.bold(), kind.red());
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
