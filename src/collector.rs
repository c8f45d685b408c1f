use std::sync::Arc;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::{CollectorConfig, FeedConfig};
use crate::enrichment::Enricher;
use crate::poller::{FeedPoller, PollError};
use crate::store::Store;
use crate::types::{CandidateRecord, NewArticle, Result};
use crate::{fingerprint, text, topics};

/// What happened to one candidate on its way through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// No topic key matched; the candidate is never persisted.
    NoTopicMatch,
    /// The fingerprint (or link) was already present, here or in a racing
    /// writer. Expected steady-state behavior, not an error.
    Duplicate,
    Inserted { id: i64, topic: String },
}

#[derive(Debug, Default, Clone)]
pub struct CycleStats {
    pub feeds_ok: usize,
    pub feeds_failed: usize,
    pub candidates: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub no_topic: usize,
}

/// Drives the poll cycle: Poller -> Matcher -> Fingerprint -> dedup check
/// -> Enrichment -> Store, sequenced per feed, with per-feed and per-cycle
/// fault isolation.
pub struct Collector {
    config: CollectorConfig,
    poller: FeedPoller,
    enricher: Enricher,
    store: Arc<Store>,
}

impl Collector {
    pub fn new(config: CollectorConfig, store: Arc<Store>) -> Self {
        let poller = FeedPoller::new(config.request_timeout);
        let enricher = Enricher::new(&config);
        Self {
            config,
            poller,
            enricher,
            store,
        }
    }

    /// Periodic loop. A failed cycle is logged and retried on the next
    /// tick; the collector's availability matters more than any single
    /// cycle. Runs until the task is cancelled.
    pub async fn run(&self) {
        info!(
            "Collector running every {:?} across {} feeds",
            self.config.poll_interval,
            self.config.feeds.len()
        );
        let mut ticker = interval(self.config.poll_interval);
        loop {
            ticker.tick().await;
            let stats = self.run_cycle().await;
            info!(
                "Cycle complete: {}/{} feeds ok, {} candidates, {} inserted, {} duplicates, {} off-topic",
                stats.feeds_ok,
                stats.feeds_ok + stats.feeds_failed,
                stats.candidates,
                stats.inserted,
                stats.duplicates,
                stats.no_topic
            );
        }
    }

    /// One complete pass over all configured feeds. Never returns an
    /// error: failures are isolated per feed and per candidate.
    pub async fn run_cycle(&self) -> CycleStats {
        let mut stats = CycleStats::default();

        for feed in &self.config.feeds {
            match self.poller.poll(feed).await {
                Ok(candidates) => {
                    stats.feeds_ok += 1;
                    stats.candidates += candidates.len();
                    self.process_candidates(feed, &candidates, &mut stats).await;
                }
                Err(PollError::Empty) => {
                    stats.feeds_ok += 1;
                    info!("No entries found in {}", feed.name);
                }
                Err(e) => {
                    stats.feeds_failed += 1;
                    warn!("Skipping feed {} this cycle: {}", feed.name, e);
                }
            }
        }

        stats
    }

    async fn process_candidates(
        &self,
        feed: &FeedConfig,
        candidates: &[CandidateRecord],
        stats: &mut CycleStats,
    ) {
        for candidate in candidates {
            match self.process_candidate(&feed.name, candidate).await {
                Ok(CandidateOutcome::Inserted { topic, .. }) => {
                    stats.inserted += 1;
                    info!("NEW ({}) [{}]: {}", topic, feed.name, candidate.title);
                }
                Ok(CandidateOutcome::Duplicate) => {
                    stats.duplicates += 1;
                    debug!("Already seen: {}", candidate.link);
                }
                Ok(CandidateOutcome::NoTopicMatch) => {
                    stats.no_topic += 1;
                }
                Err(e) => {
                    // Storage hiccups skip the candidate for this cycle
                    // only; the next poll retries it naturally.
                    error!("Failed to process '{}': {}", candidate.title, e);
                }
            }
        }
    }

    /// Runs a single candidate through normalize -> match -> fingerprint
    /// -> dedup check -> enrich -> insert. The dedup check happens before
    /// any enrichment call; a lost insert race attaches no summary.
    pub async fn process_candidate(
        &self,
        feed_name: &str,
        candidate: &CandidateRecord,
    ) -> Result<CandidateOutcome> {
        let norm_title = text::normalize_for_match(&candidate.title);
        let norm_desc = text::normalize_for_match(&candidate.description);

        let Some(topic_key) = topics::match_topic(&norm_title, &norm_desc) else {
            return Ok(CandidateOutcome::NoTopicMatch);
        };

        let fp = fingerprint::fingerprint(&candidate.title, topic_key);
        if self.store.exists_by_fingerprint(&fp).await? {
            return Ok(CandidateOutcome::Duplicate);
        }

        let label = topics::canonical_label(topic_key);

        let summary = if self.enricher.is_eligible(topic_key) {
            self.enricher.enrich(candidate, &label, feed_name).await
        } else {
            None
        };

        let article = NewArticle {
            title: candidate.title.clone(),
            link: candidate.link.clone(),
            description: candidate.description.clone(),
            source: feed_name.to_string(),
            topic: label.clone(),
            added_at: Utc::now(),
            fingerprint: fp,
        };

        let Some(id) = self.store.insert_if_absent(&article).await? else {
            // A concurrent writer won the insert; their row stands and we
            // must not double-attach a summary.
            return Ok(CandidateOutcome::Duplicate);
        };

        if let Some(summary) = summary {
            self.store.attach_summary(id, &summary).await?;
        }

        Ok(CandidateOutcome::Inserted { id, topic: label })
    }
}
