use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::exponential::ExponentialBackoff;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::text;
use crate::types::CandidateRecord;

const USER_AGENT: &str = "news-collector/0.1";
const MAX_RETRIES: u32 = 2;
const RETRY_DELAY_SECONDS: u64 = 2;

/// Why a feed produced no candidates this cycle. Never escapes the cycle
/// loop; the orchestrator logs it and moves on to the next feed.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed feed: {0}")]
    Parse(String),

    #[error("feed parsed to zero entries")]
    Empty,
}

pub struct FeedPoller {
    client: Client,
}

impl FeedPoller {
    pub fn new(request_timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// One pass over the feed's current entries. Restartable on the next
    /// scheduled invocation; every failure is an explicit `PollError`.
    pub async fn poll(&self, feed: &FeedConfig) -> Result<Vec<CandidateRecord>, PollError> {
        let content = self.fetch_with_retry(&feed.url).await?;
        let candidates = extract_candidates(&content)?;
        debug!("Feed {} produced {} candidates", feed.name, candidates.len());
        Ok(candidates)
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String, PollError> {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(RETRY_DELAY_SECONDS),
            initial_interval: Duration::from_secs(RETRY_DELAY_SECONDS),
            max_interval: Duration::from_secs(RETRY_DELAY_SECONDS * 8),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(RETRY_DELAY_SECONDS * 16)),
            ..Default::default()
        };

        let mut last_error = PollError::Empty;

        for attempt in 0..=MAX_RETRIES {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        last_error = PollError::Status(status.as_u16());
                    } else {
                        match response.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => last_error = classify(e),
                        }
                    }
                }
                Err(e) => last_error = classify(e),
            }

            if attempt < MAX_RETRIES {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error)
    }
}

/// Parses feed content into candidate records. Entries lacking a title or
/// a link are never emitted; text fields come out cleaned of markup.
pub fn extract_candidates(content: &str) -> Result<Vec<CandidateRecord>, PollError> {
    let parsed = parser::parse(content.as_bytes()).map_err(|e| PollError::Parse(e.to_string()))?;

    let mut candidates = Vec::new();
    for entry in parsed.entries {
        let title = text::clean(entry.title.as_ref().map(|t| t.content.as_str()).unwrap_or(""));
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();

        if title.is_empty() || link.is_empty() {
            debug!("Skipping entry without title or link");
            continue;
        }

        let description = text::clean(
            entry
                .summary
                .as_ref()
                .map(|s| s.content.as_str())
                .unwrap_or(""),
        );

        // The feed's claimed publish time is untrusted; carried as text.
        let publish_date_text = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        candidates.push(CandidateRecord {
            title,
            link,
            description,
            publish_date_text,
        });
    }

    if candidates.is_empty() {
        return Err(PollError::Empty);
    }

    Ok(candidates)
}

fn classify(error: reqwest::Error) -> PollError {
    if error.is_timeout() {
        PollError::Timeout
    } else {
        PollError::Http(error)
    }
}
