use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Categories accepted by the headlines provider.
pub const NEWS_CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

pub fn is_known_category(category: &str) -> bool {
    NEWS_CATEGORIES.contains(&category)
}

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("news provider answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("news provider unavailable: {0}")]
    Unavailable(String),
}

/// NewsService
///
/// Contract for the headlines proxy. The real client talks to the provider over HTTP;
/// the mock returns canned JSON so handlers can be tested offline.
#[async_trait]
pub trait NewsService: Send + Sync {
    /// Top US headlines for a category, returned as the provider's JSON document.
    async fn top_headlines(&self, category: &str) -> Result<Value, NewsError>;
}

/// NewsApiClient
///
/// HTTP client for a newsapi.org-compatible `top-headlines` endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, NewsError> {
        // The provider rejects requests without a User-Agent.
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl NewsService for NewsApiClient {
    async fn top_headlines(&self, category: &str) -> Result<Value, NewsError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("country", "us"),
                ("category", category),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsError::Status(response.status()));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// MockNewsService
///
/// In-memory stand-in for the provider. Echoes the requested category inside a
/// provider-shaped document, or fails on demand.
#[derive(Clone, Default)]
pub struct MockNewsService {
    /// When true, every call returns a simulated provider failure.
    pub should_fail: bool,
}

impl MockNewsService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl NewsService for MockNewsService {
    async fn top_headlines(&self, category: &str) -> Result<Value, NewsError> {
        if self.should_fail {
            return Err(NewsError::Unavailable("simulated outage".to_string()));
        }

        Ok(serde_json::json!({
            "status": "ok",
            "totalResults": 1,
            "articles": [
                { "title": format!("Top {category} story"), "source": { "name": "mock" } }
            ]
        }))
    }
}

/// NewsState
///
/// The concrete type used to share the news client across the application state.
pub type NewsState = Arc<dyn NewsService>;
