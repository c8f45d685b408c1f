use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A durable, deduplicated story as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub description: String,
    pub source: String,
    pub topic: String,
    pub summary: Option<String>,
    pub added_at: DateTime<Utc>,
    pub fingerprint: String,
}

/// Insert payload for an article; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub description: String,
    pub source: String,
    pub topic: String,
    pub added_at: DateTime<Utc>,
    pub fingerprint: String,
}

/// A raw feed entry after minimal field extraction, before topic matching.
/// All text fields are already cleaned of markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    pub publish_date_text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, CollectorError>;
