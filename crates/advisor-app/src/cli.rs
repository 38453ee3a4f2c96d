//! CLI argument definitions for the advisor.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Advisor: chat with the L'Oréal Smart Product Advisor from a terminal.
#[derive(Parser, Debug)]
#[command(name = "advisor", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Completion proxy URL.
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Write the conversation as an HTML page to this path on exit.
    #[arg(short = 't', long = "transcript")]
    pub transcript: Option<PathBuf>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "write-config")]
    pub write_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ADVISOR_CONFIG env var > ~/.advisor/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ADVISOR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the endpoint URL.
    ///
    /// Priority: --endpoint flag > ADVISOR_ENDPOINT env var > config file value.
    pub fn resolve_endpoint(&self, config_url: &str) -> String {
        if let Some(ref url) = self.endpoint {
            return url.clone();
        }
        if let Ok(url) = std::env::var("ADVISOR_ENDPOINT") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_url.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".advisor").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".advisor").join("config.toml");
    }
    PathBuf::from("config.toml")
}
