//! News API client configuration

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// News API configuration
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// API root (default: https://newsapi.org/v2)
    pub base_url: String,
    /// API key sent as `X-Api-Key`
    pub api_key: String,
    /// Articles requested per topic
    pub page_size: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Topics searched at once
    pub max_concurrent: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            api_key: std::env::var("NEWSAPI_KEY").unwrap_or_default(),
            page_size: 5,
            timeout_secs: 30,
            max_concurrent: 4,
        }
    }
}

impl NewsConfig {
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Errors from the news layer
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Missing news API key")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("News API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Parse(String),
}

/// Create an HTTP client for the news API
pub fn create_client(config: &NewsConfig) -> Result<Client, NewsError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("dealflow/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| NewsError::ClientBuild(e.to_string()))
}
