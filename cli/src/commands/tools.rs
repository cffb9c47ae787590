//! `tools` command: discover and print the server's tool list

use anyhow::Result;
use colored::Colorize;
use ticket_mcp_core::Settings;

use super::build_client;

pub async fn tools_command(settings: Settings, refresh: bool) -> Result<()> {
    let client = build_client(&settings)?;
    let tools = client.discover(refresh).await?;

    println!(
        "{} tools available from {}\n",
        tools.len(),
        settings.client.server_url.bold()
    );

    for tool in tools.iter() {
        println!("{}", tool.name.bold().cyan());
        println!("  {}", tool.description);
        for (field, spec) in &tool.input_schema.properties {
            let required = if tool.is_required(field) {
                "required".yellow().to_string()
            } else {
                "optional".dimmed().to_string()
            };
            let mut kind = spec.param_type.as_str().to_string();
            if let Some(values) = &spec.enum_values {
                kind = format!("{} [{}]", kind, values.join("|"));
            }
            println!("  {} {} ({}) - {}", "·".dimmed(), field, kind, required);
        }
        println!();
    }
    Ok(())
}
