use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::ApiClient;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Set the registry server URL")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:5000")]
        url: String,
    },

    #[command(about = "Show the configured server URL")]
    Show,

    #[command(about = "Check server health status from the /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            // Reject anything the client could not talk to
            let client = ApiClient::new(&url)?;
            let url = client.base_url().as_str().trim_end_matches('/').to_string();
            save_server_config(&ServerConfig::new(url.clone()))?;

            output_success(
                &output_format,
                &format!("Server set to {}", url),
                Some(json!({ "url": url })),
            )
        }
        ServerCommands::Show => {
            let config = load_server_config()?;
            match output_format {
                OutputFormat::Json => output_json(&config),
                OutputFormat::Text => {
                    println!("Server: {}", config.url);
                    if let Some(updated_at) = config.updated_at {
                        println!("Updated: {}", updated_at.format("%Y-%m-%d %H:%M"));
                    }
                    Ok(())
                }
            }
        }
        ServerCommands::Health => {
            let client = api_client(None)?;
            let health = client.health().await?;

            match output_format {
                OutputFormat::Json => output_json(&health),
                OutputFormat::Text => {
                    let field = |name: &str| health.get(name).and_then(|v| v.as_str()).unwrap_or("unknown").to_string();
                    println!("Server:   {}", client.base_url());
                    println!("Status:   {}", field("status"));
                    println!("Database: {} ({})", field("database"), field("backend"));
                    Ok(())
                }
            }
        }
    }
}
