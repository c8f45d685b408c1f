use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::store::Store;
use crate::types::Article;

pub const DEFAULT_READ_TTL: Duration = Duration::from_secs(10);

/// Bounded-TTL cache for read-query results. Pure load shedding: any
/// staleness it introduces is bounded by the TTL and carries no
/// correctness obligation. Owned by the read layer, injected at
/// construction; there is no process-wide singleton.
pub struct ReadCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Vec<Article>)>>,
}

impl ReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<Article>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn set(&self, key: String, value: Vec<Article>) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), value));
    }
}

/// Read-side facade consumed by the presentation layer: the store's read
/// queries behind the TTL cache, degrading to empty results on storage
/// failure instead of surfacing an error to the caller.
pub struct CachedReads {
    store: Arc<Store>,
    cache: ReadCache,
    latest: RwLock<Option<(Instant, Option<DateTime<Utc>>)>>,
}

impl CachedReads {
    pub fn new(store: Arc<Store>, cache: ReadCache) -> Self {
        Self {
            store,
            cache,
            latest: RwLock::new(None),
        }
    }

    pub async fn recent_articles(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Vec<Article> {
        let key = format!("recent:{}:{}:{}", limit, offset, search.unwrap_or(""));
        if let Some(hit) = self.cache.get(&key).await {
            return hit;
        }
        let rows = match self.store.recent_articles(limit, offset, search).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Read query failed, returning empty result set: {}", e);
                return Vec::new();
            }
        };
        self.cache.set(key, rows.clone()).await;
        rows
    }

    pub async fn articles_by_topic(&self, topic: &str, limit: i64, offset: i64) -> Vec<Article> {
        let key = format!("topic:{}:{}:{}", topic.to_lowercase(), limit, offset);
        if let Some(hit) = self.cache.get(&key).await {
            return hit;
        }
        let rows = match self.store.articles_by_topic(topic, limit, offset).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Read query failed, returning empty result set: {}", e);
                return Vec::new();
            }
        };
        self.cache.set(key, rows.clone()).await;
        rows
    }

    pub async fn max_added_at(&self) -> Option<DateTime<Utc>> {
        {
            let latest = self.latest.read().await;
            if let Some((stored_at, value)) = *latest {
                if stored_at.elapsed() < DEFAULT_READ_TTL {
                    return value;
                }
            }
        }
        let value = match self.store.max_added_at().await {
            Ok(value) => value,
            Err(e) => {
                warn!("Read query failed for max timestamp: {}", e);
                None
            }
        };
        *self.latest.write().await = Some((Instant::now(), value));
        value
    }
}
