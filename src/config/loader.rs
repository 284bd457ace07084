use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::DiffLayoutMode;

pub const TOKEN_ENV: &str = "MRTABS_TOKEN";
pub const CONFIG_ENV: &str = "MRTABS_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_token: Option<String>,
    pub diff_view: DiffLayoutMode,
    pub request_timeout_secs: u64,
    pub log_filter: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://gitlab.com".to_string(),
            private_token: None,
            diff_view: DiffLayoutMode::Inline,
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(Self::default_config_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn default_config_path() -> PathBuf {
        if let Some(config_path) = std::env::var_os(CONFIG_ENV) {
            PathBuf::from(config_path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mrtabs")
                .join("config.yaml")
        }
    }

    /// Token from the config file, falling back to `$MRTABS_TOKEN`.
    pub fn private_token(&self) -> Option<String> {
        self.private_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("mrtabs")
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_private_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.private_token = token;
        }
        self
    }

    pub fn with_diff_view(mut self, diff_view: Option<DiffLayoutMode>) -> Self {
        if let Some(mode) = diff_view {
            self.diff_view = mode;
        }
        self
    }
}
