use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ragdex_agent::{AgentConfig, AgentRunner, GeminiClient, all_roles, find_role};
use ragdex_embed::EmbeddingConfig;
use ragdex_indexing::{ApiConfig, build_service};
use ragdex_search::SearchConfig;
use ragdex_tools::{ToolClient, ToolClientConfig, ToolServerConfig};
use ragdex_ui::console::{display_banner, read_input_with_history};
use ragdex_ui::{ApiClient, UiConfig};

#[derive(Parser)]
#[command(name = "ragdex")]
#[command(about = "Document indexing, semantic search and RAG agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the indexing HTTP API
    Api,
    /// Serve the search tools over MCP
    Tools,
    /// Ask the agents a question, or chat interactively when no prompt is given
    Agent {
        prompt: Option<String>,
        /// Role to run, e.g. orchestrator or web_search
        #[arg(short, long, default_value = "orchestrator")]
        role: String,
    },
    /// Open the interactive indexing console
    Ui,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Api => {
            init_tracing("info");
            let service = build_service(&EmbeddingConfig::from_env()?, &SearchConfig::from_env()?)?;
            ragdex_indexing::run_server(&ApiConfig::from_env()?, service).await?;
        }
        Commands::Tools => {
            init_tracing("info");
            let service = build_service(&EmbeddingConfig::from_env()?, &SearchConfig::from_env()?)?;
            ragdex_tools::run_server(&ToolServerConfig::from_env()?, service).await?;
        }
        Commands::Agent { prompt, role } => {
            init_tracing("warn");
            run_agent(prompt, &role).await?;
        }
        Commands::Ui => {
            init_tracing("warn");
            let client = ApiClient::new(&UiConfig::from_env()?)?;
            ragdex_ui::run(&client).await?;
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_agent(prompt: Option<String>, role_name: &str) -> Result<()> {
    let role = find_role(role_name).ok_or_else(|| {
        let names: Vec<&str> = all_roles().iter().map(|role| role.name).collect();
        anyhow!("unknown role '{}', expected one of: {}", role_name, names.join(", "))
    })?;

    let config = AgentConfig::from_env()?;
    let max_turns = config.max_turns;
    let model = config.model.clone();
    let llm = Arc::new(GeminiClient::new(config)?);

    let tools = ToolClient::new(&ToolClientConfig::from_env()?);
    if let Err(e) = tools.connect().await {
        warn!(endpoint = tools.endpoint(), error = %e, "tool server handshake failed");
    }

    let runner = AgentRunner::new(llm, Arc::new(tools), max_turns);

    if let Some(prompt) = prompt {
        println!("{}", runner.run(&role, &prompt).await?);
        return Ok(());
    }

    display_banner(
        "ragdex - Agent",
        &[
            format!("Role: {}", role.name).as_str(),
            format!("Model: {}", model).as_str(),
            "",
            "'reset' clears the conversation, 'exit' quits.",
        ],
    );

    let mut input_history = Vec::new();
    let mut conversation = Vec::new();

    loop {
        let input = read_input_with_history("ragdex", &mut input_history)?;
        let input = input.trim();

        match input.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            "reset" => {
                conversation.clear();
                println!("{}", "Conversation cleared.".dimmed());
                continue;
            }
            _ => {}
        }

        println!("{} Thinking...", "🤖".blue());
        let checkpoint = conversation.len();
        match runner.converse(&role, &mut conversation, input.to_string()).await {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => {
                conversation.truncate(checkpoint);
                eprintln!("{} {}", "❌".red(), e.to_string().red());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults_to_orchestrator() {
        let cli = Cli::try_parse_from(["ragdex", "agent", "what is in the handbook?"]).unwrap();
        match cli.command {
            Commands::Agent { prompt, role } => {
                assert_eq!(prompt.as_deref(), Some("what is in the handbook?"));
                assert_eq!(role, "orchestrator");
            }
            _ => panic!("expected agent command"),
        }
    }

    #[test]
    fn test_agent_role_flag() {
        let cli = Cli::try_parse_from(["ragdex", "agent", "--role", "web_search"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Agent { prompt: None, ref role } if role == "web_search"
        ));
    }
}
