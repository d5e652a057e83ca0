use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, StoredSession};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            updated_at: None,
        }
    }
}

impl ServerConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            updated_at: Some(Utc::now()),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("REGISTRY_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("registry").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let server_file = get_config_dir()?.join("server.json");

    if !server_file.exists() {
        return Ok(ServerConfig::default());
    }

    let content = fs::read_to_string(server_file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_server_config(config: &ServerConfig) -> anyhow::Result<()> {
    let server_file = get_config_dir()?.join("server.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(server_file, content)?;
    Ok(())
}

pub fn load_session() -> anyhow::Result<Option<StoredSession>> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save_session(session: &StoredSession) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

/// Returns whether a session file was present
pub fn clear_session() -> anyhow::Result<bool> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(false);
    }

    fs::remove_file(session_file)?;
    Ok(true)
}

/// Client for the configured server. `REGISTRY_SERVER_URL` overrides the
/// stored URL for one invocation.
pub fn api_client(token: Option<String>) -> anyhow::Result<ApiClient> {
    let url = match std::env::var("REGISTRY_SERVER_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => load_server_config()?.url,
    };
    Ok(ApiClient::new(&url)?.with_token(token))
}
