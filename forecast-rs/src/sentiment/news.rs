//! Headline source backed by the NewsAPI `top-headlines` endpoint

use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Headlines requested per query
pub const PAGE_SIZE: usize = 10;

/// One news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<String>,
}

impl Headline {
    pub fn new(title: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            title: title.into(),
            description: description.map(str::to_string),
            url: None,
            source: None,
            published_at: None,
        }
    }

    /// Case-sensitive match against the title or the description
    pub fn mentions(&self, symbol: &str) -> bool {
        self.title.contains(symbol)
            || self
                .description
                .as_deref()
                .map(|d| d.contains(symbol))
                .unwrap_or(false)
    }

    /// `"{title}. {description}"`, or the bare title without a description
    pub fn text(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => format!("{}. {}", self.title, d),
            _ => self.title.clone(),
        }
    }
}

/// Source of recent headlines for a company symbol
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Up to [`PAGE_SIZE`] English top headlines matching `query`
    async fn top_headlines(&self, query: &str) -> Result<Vec<Headline>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<ArticleSource>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// NewsAPI client; the key comes from configuration
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn top_headlines(&self, query: &str) -> Result<Vec<Headline>> {
        let key = self.api_key.as_deref().ok_or(ForecastError::MissingNewsApiKey)?;
        let url = format!("{}/v2/top-headlines", self.base_url);
        info!(query, "Fetching top headlines");

        let page_size = PAGE_SIZE.to_string();
        let body = self
            .client
            .get(&url)
            .header("X-Api-Key", key)
            .query(&[("q", query), ("language", "en"), ("pageSize", page_size.as_str())])
            .send()
            .await?
            .text()
            .await?;

        let headlines = parse_headlines(&body)?;
        debug!(count = headlines.len(), "Headlines received");
        Ok(headlines)
    }
}

/// Decode a `top-headlines` body; articles without a title are skipped
pub fn parse_headlines(body: &str) -> Result<Vec<Headline>> {
    let response: NewsResponse = serde_json::from_str(body)?;
    if response.status != "ok" {
        return Err(ForecastError::News(format!(
            "{}: {}",
            response.code.unwrap_or_else(|| response.status.clone()),
            response.message.unwrap_or_default()
        )));
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| {
            Some(Headline {
                title: a.title?,
                description: a.description,
                url: a.url,
                source: a.source.and_then(|s| s.name),
                published_at: a.published_at,
            })
        })
        .take(PAGE_SIZE)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": null, "name": "Reuters"},
                "title": "AAPL shares rally after strong quarter",
                "description": null,
                "url": "https://example.com/a",
                "publishedAt": "2022-12-30T10:00:00Z"
            },
            {
                "source": {"id": null, "name": "Wire"},
                "title": null,
                "description": "untitled"
            }
        ]
    }"#;

    #[test]
    fn test_parse_headlines() {
        let headlines = parse_headlines(OK_BODY).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].source.as_deref(), Some("Reuters"));
        assert_eq!(headlines[0].text(), "AAPL shares rally after strong quarter");
    }

    #[test]
    fn test_error_body() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let err = parse_headlines(body).unwrap_err();
        assert!(matches!(err, ForecastError::News(ref m) if m.starts_with("apiKeyInvalid")));
    }

    #[test]
    fn test_mentions_is_case_sensitive() {
        let h = Headline::new("Apple unveils new phone", Some("AAPL up 2%"));
        assert!(h.mentions("AAPL"));
        assert!(!h.mentions("aapl"));
        assert!(!Headline::new("Markets", None).mentions("AAPL"));
        assert_eq!(h.text(), "Apple unveils new phone. AAPL up 2%");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = NewsApiClient::new("http://localhost:1", Some("  ".to_string()), 1).unwrap();
        assert!(!client.has_key());
        let err = client.top_headlines("AAPL").await.unwrap_err();
        assert!(matches!(err, ForecastError::MissingNewsApiKey));
    }
}
