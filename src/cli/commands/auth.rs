use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::{require_session, ClientError, StoredSession};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Unlock the dashboard with the admin password")]
    Login {
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored admin session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Admin password: ")?,
            };

            let client = api_client(None)?;
            let response = match client.login(&password).await {
                Ok(response) => response,
                Err(ClientError::Unauthorized(_)) => {
                    return Err(anyhow::anyhow!("Invalid password. Access denied."))
                }
                Err(e) => return Err(e.into()),
            };

            let session = StoredSession::from_login(response, Utc::now());
            save_session(&session)?;
            tracing::debug!("Stored admin session expiring {:?}", session.expires_at);

            output_success(
                &output_format,
                "Logged in. Dashboard commands are unlocked.",
                Some(json!({ "expiresAt": session.expires_at })),
            )
        }
        AuthCommands::Logout => {
            let removed = clear_session()?;
            let message = if removed { "Logged out" } else { "No active session" };
            output_success(&output_format, message, Some(json!({ "loggedOut": removed })))
        }
        AuthCommands::Status => {
            let session = load_session()?;
            let token = match require_session(session.as_ref(), Utc::now()) {
                Ok(token) => token.to_string(),
                Err(e) => {
                    return match output_format {
                        OutputFormat::Json => output_json(&json!({ "authenticated": false, "reason": e.to_string() })),
                        OutputFormat::Text => {
                            println!("{}", e);
                            Ok(())
                        }
                    };
                }
            };

            // Confirm the server still accepts the token
            let whoami = api_client(Some(token))?.whoami().await?;
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "authenticated": true,
                    "role": whoami.role,
                    "expiresAt": whoami.expires_at,
                })),
                OutputFormat::Text => {
                    println!("Logged in as {}", whoami.role);
                    if let Some(expires_at) = whoami.expires_at {
                        println!("Session expires {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
                    }
                    Ok(())
                }
            }
        }
    }
}
