use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{CollectorError, Result};

pub const DEFAULT_POLL_SECONDS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 20;
pub const DEFAULT_SUMMARY_API_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-5";

/// One configured syndication endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

/// Collector configuration, resolved once at startup. The storage backend
/// is selected here from the environment and never re-probed per call.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub feeds: Vec<FeedConfig>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    /// Topic keys eligible for an externally generated summary. A strict
    /// subset of the vocabulary; empty by default to bound cost.
    pub enrichment_topics: HashSet<String>,
    pub summary_api_url: String,
    pub summary_api_key: Option<String>,
    pub summary_model: String,
}

impl CollectorConfig {
    pub fn from_env() -> Self {
        let enrichment_topics = env::var("AI_SUMMARY_TOPICS")
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            feeds: default_feeds(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECONDS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            enrichment_topics,
            summary_api_url: env::var("SUMMARY_API_URL")
                .unwrap_or_else(|_| DEFAULT_SUMMARY_API_URL.to_string()),
            summary_api_key: env::var("SUMMARY_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok(),
            summary_model: env::var("SUMMARY_MODEL")
                .unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.to_string()),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECONDS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            enrichment_topics: HashSet::new(),
            summary_api_url: DEFAULT_SUMMARY_API_URL.to_string(),
            summary_api_key: None,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
        }
    }
}

/// Loads a feed list from a JSON file: `[{"name": "...", "url": "..."}]`.
/// Every URL must parse and use http(s).
pub fn load_feeds_file(path: &Path) -> Result<Vec<FeedConfig>> {
    let content = std::fs::read_to_string(path)?;
    let feeds: Vec<FeedConfig> = serde_json::from_str(&content)?;
    for feed in &feeds {
        let parsed = Url::parse(&feed.url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CollectorError::General(format!(
                "feed '{}' has unsupported scheme: {}",
                feed.name, feed.url
            )));
        }
    }
    Ok(feeds)
}

pub fn default_feeds() -> Vec<FeedConfig> {
    [
        ("BBC", "http://feeds.bbci.co.uk/news/rss.xml"),
        ("BBC World", "http://feeds.bbci.co.uk/news/world/rss.xml"),
        ("CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/"),
        ("The Guardian", "https://www.theguardian.com/rss"),
        ("RT (Russia Today)", "https://www.rt.com/rss/"),
        (
            "The Jerusalem Post",
            "https://www.jpost.com/rss/rssfeedsfrontpage.aspx",
        ),
        ("Just the News", "https://justthenews.com/rss.xml"),
        ("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
        ("Reuters", "http://feeds.reuters.com/reuters/topNews"),
        (
            "Google News (Trump/Election 24h)",
            "https://news.google.com/rss/search?q=trump+OR+election+when:1d&hl=en-US&gl=US&ceid=US:en",
        ),
        (
            "Google News (AI 24h)",
            "https://news.google.com/rss/search?q=artificial+intelligence+when:1d&hl=en-US&gl=US&ceid=US:en",
        ),
    ]
    .iter()
    .map(|(name, url)| FeedConfig {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}
