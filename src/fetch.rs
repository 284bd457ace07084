use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid panel response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Body of a `diffs.json` / `commits.json` response. Only `html` is read;
/// the remaining fields are kept opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelContent {
    pub html: String,
    #[allow(dead_code)]
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PanelContent {
    #[cfg(test)]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[async_trait(?Send)]
pub trait PanelFetcher {
    /// GET `url` (a path relative to the instance) and decode the panel body.
    async fn get_json(&self, url: &str) -> Result<PanelContent, FetchError>;
}

/// Fetches panel content from a GitLab instance.
pub struct HttpFetcher {
    base_url: String,
    client: Client,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.private_token() {
            let value = HeaderValue::from_str(&token)
                .map_err(|e| FetchError::Config(format!("private token: {}", e)))?;
            headers.insert(PRIVATE_TOKEN_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::new(config.base_url.clone(), client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

#[async_trait(?Send)]
impl PanelFetcher for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<PanelContent, FetchError> {
        let url = self.absolute_url(url);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let content = serde_json::from_str::<PanelContent>(&body)?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_content_keeps_extra_fields_opaque() {
        let json = r#"{"html":"<div></div>","count":3,"discussions":[]}"#;
        let content: PanelContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.html, "<div></div>");
        assert_eq!(content.extra.len(), 2);
        assert!(content.extra.contains_key("count"));
    }

    #[test]
    fn panel_content_requires_html_field() {
        let result = serde_json::from_str::<PanelContent>(r#"{"count":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn http_fetcher_joins_relative_urls() {
        let fetcher = HttpFetcher::new("https://gitlab.example.com/", Client::new());
        assert_eq!(fetcher.base_url(), "https://gitlab.example.com");
        assert_eq!(
            fetcher.absolute_url("/foo/bar/merge_requests/1/diffs.json"),
            "https://gitlab.example.com/foo/bar/merge_requests/1/diffs.json"
        );
        assert_eq!(
            fetcher.absolute_url("https://other.example.com/x.json"),
            "https://other.example.com/x.json"
        );
    }

    #[test]
    fn http_fetcher_from_config_accepts_token() {
        let config = Config::default().with_private_token(Some("glpat-abc".to_string()));
        assert!(HttpFetcher::from_config(&config).is_ok());
    }

    #[test]
    fn http_fetcher_from_config_rejects_invalid_token() {
        let config = Config::default().with_private_token(Some("bad\ntoken".to_string()));
        assert!(matches!(
            HttpFetcher::from_config(&config),
            Err(FetchError::Config(_))
        ));
    }
}
