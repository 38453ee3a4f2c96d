use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AdvisorError, Result};

/// Proxy endpoint that relays requests to the completion provider.
pub const DEFAULT_ENDPOINT: &str = "https://wanderbot-worker.fme2114.workers.dev/";

/// First bubble shown in an empty conversation.
pub const DEFAULT_GREETING: &str =
    "👋 Hello! I'm your L'Oréal Smart Product Advisor. How can I help you today?";

/// Top-level configuration for the advisor.
///
/// Loaded from `~/.advisor/config.toml` by default. Every section is
/// optional; missing keys fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AdvisorConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AdvisorConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Like `load`, but an absent file silently yields the defaults and an
    /// unreadable or invalid one yields them with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(AdvisorError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Configuration written");
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// URL the chat transcript is POSTed to.
    pub url: String,
    /// Request timeout in seconds. 0 waits indefinitely.
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 0,
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum number of trailing history messages sent per request.
    /// 0 sends the whole conversation.
    pub max_history: usize,
    /// Greeting rendered at start and after a reset.
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history: 0,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}
