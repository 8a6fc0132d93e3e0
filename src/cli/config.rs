use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CARS_URL: &str = "https://car-nextjs-api.cheatdev.online";
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/api/proxy";
pub const DEFAULT_REFRESH_URL: &str = "http://localhost:3000/api/refresh";
pub const DEFAULT_LOGOUT_URL: &str = "http://localhost:3000/api/logout";

/// Stored credentials. Rewritten after every command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionFile {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            updated_at: Some(Utc::now()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Car inventory API, called directly
    pub cars_url: String,
    /// Gateway proxy in front of the banking API
    pub relay_url: String,
    pub refresh_url: String,
    pub logout_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            cars_url: DEFAULT_CARS_URL.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            refresh_url: DEFAULT_REFRESH_URL.to_string(),
            logout_url: DEFAULT_LOGOUT_URL.to_string(),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("AUTOBANK_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("autobank").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<SessionFile> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(SessionFile::default());
    }

    let content = fs::read_to_string(session_file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_session(session: &SessionFile) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    if session_file.exists() {
        fs::remove_file(session_file)?;
    }
    Ok(())
}

pub fn load_endpoints() -> anyhow::Result<EndpointConfig> {
    let endpoints_file = get_config_dir()?.join("endpoints.json");

    if !endpoints_file.exists() {
        return Ok(EndpointConfig::default());
    }

    let content = fs::read_to_string(endpoints_file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_endpoints(endpoints: &EndpointConfig) -> anyhow::Result<()> {
    let endpoints_file = get_config_dir()?.join("endpoints.json");

    let content = serde_json::to_string_pretty(endpoints)?;
    fs::write(endpoints_file, content)?;
    Ok(())
}
