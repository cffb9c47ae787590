//! `chat` command: interactive LLM loop with automatic tool calling

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use std::sync::Arc;
use ticket_mcp_core::llm::OpenAiClient;
use ticket_mcp_core::{AgentConfig, ChatAgent, Settings};

use super::build_client;

pub async fn chat_command(settings: Settings) -> Result<()> {
    settings.validate_llm()?;

    let llm = Arc::new(OpenAiClient::from_settings(&settings.llm)?);
    let client = build_client(&settings)?;

    let config = AgentConfig {
        max_tokens: settings.llm.max_tokens,
        temperature: settings.llm.temperature,
        ..Default::default()
    };
    let mut agent = ChatAgent::new(llm, client, config).await?;

    println!(
        "{} connected to {} with {} tools",
        "✓".green(),
        settings.client.server_url.bold(),
        agent.available_tools().len()
    );
    println!(
        "{}",
        "Type a message, /reset to clear the conversation, or /quit to leave.".dimmed()
    );

    loop {
        let line: String = Input::new().with_prompt("you").interact_text()?;
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                agent.reset();
                println!("{}", "conversation cleared".dimmed());
                continue;
            }
            "/tools" => {
                for name in agent.available_tools() {
                    println!("  {}", name.cyan());
                }
                continue;
            }
            _ => {}
        }

        match agent.chat(line).await {
            Ok(answer) => println!("{} {}", "assistant".bold().green(), answer),
            Err(e) => println!("{} {}", "error".bold().red(), e),
        }
    }
    Ok(())
}
