//! Topic search against the news API
//!
//! Queries the `everything` endpoint and returns the article metadata the
//! extraction step needs.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::{create_client, NewsConfig, NewsError};

/// A news article as returned by the search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Publisher name
    pub source: Option<String>,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Truncated article body
    pub content: Option<String>,
}

/// News found for one topic
#[derive(Debug, Clone)]
pub struct TopicResult {
    pub topic: String,
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    source: Option<ApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    message: Option<String>,
}

/// Client for topic searches
pub struct NewsClient {
    http: Client,
    config: NewsConfig,
}

impl NewsClient {
    pub fn new(config: NewsConfig) -> Result<Self, NewsError> {
        let http = create_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    /// Request URL for a topic search
    pub fn search_url(&self, topic: &str) -> String {
        format!(
            "{}/everything?q={}&pageSize={}",
            self.config.base_url,
            urlencoding::encode(topic),
            self.config.page_size
        )
    }

    /// Search one topic
    pub async fn search(&self, topic: &str) -> Result<Vec<NewsItem>, NewsError> {
        if self.config.api_key.is_empty() {
            return Err(NewsError::MissingApiKey);
        }

        debug!("Searching news for topic: {}", topic);

        let response = self
            .http
            .get(self.search_url(topic))
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(body);
            return Err(NewsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let items = parse_search_response(&body)?;
        debug!("Topic {} returned {} articles", topic, items.len());
        Ok(items)
    }

    /// Search several topics concurrently.
    ///
    /// Results keep topic order. Failed topics are logged and skipped;
    /// an article already returned for an earlier topic is not repeated.
    pub async fn search_topics(&self, topics: &[String]) -> Vec<TopicResult> {
        use futures::stream::{self, StreamExt};

        let fetched: Vec<_> = stream::iter(topics.iter().cloned())
            .map(|topic| async move {
                let result = self.search(&topic).await;
                (topic, result)
            })
            .buffered(self.config.max_concurrent.max(1))
            .collect()
            .await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        for (topic, result) in fetched {
            match result {
                Ok(items) => {
                    let items = dedupe(items, &mut seen);
                    results.push(TopicResult { topic, items });
                }
                Err(e) => {
                    warn!("News search for {} failed: {}", topic, e);
                }
            }
        }

        results
    }
}

/// Parse a successful search response body
pub fn parse_search_response(body: &str) -> Result<Vec<NewsItem>, NewsError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| NewsError::Parse(e.to_string()))?;

    if response.status != "ok" {
        return Err(NewsError::Parse(
            response
                .message
                .unwrap_or_else(|| format!("status {}", response.status)),
        ));
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| {
            // Articles without a link cannot be cited in the report
            let url = a.url.filter(|u| !u.is_empty())?;
            Some(NewsItem {
                source: a.source.and_then(|s| s.name),
                author: a.author,
                title: a.title.unwrap_or_default(),
                description: a.description,
                url,
                published_at: a.published_at,
                content: a.content,
            })
        })
        .collect())
}

fn dedupe(items: Vec<NewsItem>, seen: &mut HashSet<String>) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter(|item| seen.insert(item.url.trim_end_matches('/').to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "City Wire"},
                "author": "J. Smith",
                "title": "Buyout firm circles UK retailer",
                "description": "A mid-market fund is weighing an offer.",
                "url": "https://news.example/buyout",
                "urlToImage": null,
                "publishedAt": "2024-05-01T08:30:00Z",
                "content": "The fund has approached the board..."
            },
            {
                "source": {"id": null, "name": "Removed"},
                "title": "[Removed]",
                "url": null
            },
            {
                "source": null,
                "title": null,
                "url": "https://news.example/fintech"
            }
        ]
    }"#;

    #[test]
    fn test_parse_search_response() {
        let items = parse_search_response(BODY).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source.as_deref(), Some("City Wire"));
        assert_eq!(
            items[0].published_at.unwrap().to_rfc3339(),
            "2024-05-01T08:30:00+00:00"
        );
        assert_eq!(items[1].title, "");
        assert!(items[1].source.is_none());
    }

    #[test]
    fn test_error_status_in_body() {
        let body = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#;
        match parse_search_response(body) {
            Err(NewsError::Parse(message)) => assert_eq!(message, "Your API key is invalid."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_search_url_encodes_topic() {
        let client = NewsClient::new(NewsConfig::default().with_api_key("k")).unwrap();
        assert_eq!(
            client.search_url("private equity"),
            "https://newsapi.org/v2/everything?q=private%20equity&pageSize=5"
        );
    }

    #[test]
    fn test_dedupe_across_topics() {
        let mut seen = HashSet::new();
        let first = dedupe(parse_search_response(BODY).unwrap(), &mut seen);
        let again = dedupe(parse_search_response(BODY).unwrap(), &mut seen);
        assert_eq!(first.len(), 2);
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = NewsClient::new(NewsConfig::default().with_api_key("")).unwrap();
        assert!(matches!(
            client.search("buyout").await,
            Err(NewsError::MissingApiKey)
        ));
        assert!(client.search_topics(&["buyout".to_string()]).await.is_empty());
    }
}
