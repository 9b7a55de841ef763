//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development.
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

use crate::prompt::extract::ExtractMode;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPLATE_PATH: &str = "freestyle/data_ui_agent.yaml";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid AGENT_EXTRACT_MODE '{0}', expected 'greedy' or 'balanced'")]
    ExtractMode(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub host: String,
    pub port: String,
    pub template_path: PathBuf,
    pub level: String,
    pub extract_mode: ExtractMode,
    pub agent_url: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, ConfigError> {
        let mode = env::var("AGENT_EXTRACT_MODE").unwrap_or_else(|_| "greedy".to_string());
        let extract_mode: ExtractMode = mode.parse().map_err(|_| ConfigError::ExtractMode(mode.clone()))?;
        Ok(Config {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string()),
            template_path: env::var("FREESTYLE_YAML")
                .unwrap_or_else(|_| DEFAULT_TEMPLATE_PATH.to_string())
                .into(),
            level: env::var("FREESTYLE_LEVEL").unwrap_or_else(|_| "1".to_string()),
            extract_mode,
            agent_url: env::var("AGENT_URL").unwrap_or_else(|_| format!("http://localhost:{}", DEFAULT_PORT)),
        })
    }

    /// `FREESTYLE_LEVEL=0` answers every request without calling the model.
    pub fn offline(&self) -> bool {
        self.level.trim() == "0"
    }

    /// Resolve the bind address, falling back to defaults on unparsable values.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip: IpAddr = self.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid HOST '{}', falling back to {}", self.host, DEFAULT_HOST);
            IpAddr::from([0, 0, 0, 0])
        });
        let port: u16 = self.port.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid PORT '{}', falling back to {}", self.port, DEFAULT_PORT);
            DEFAULT_PORT
        });
        SocketAddr::new(ip, port)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            model = %self.openai_model,
            base_url = %self.openai_base_url,
            api_key_set = self.openai_api_key.is_some(),
            template = %self.template_path.display(),
            level = %self.level,
            extract_mode = ?self.extract_mode,
            "effective configuration"
        );
    }
}
