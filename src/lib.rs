pub mod cache;
pub mod collector;
pub mod config;
pub mod enrichment;
pub mod fingerprint;
pub mod health;
pub mod poller;
pub mod store;
pub mod text;
pub mod topics;
pub mod types;

pub use cache::{CachedReads, ReadCache};
pub use collector::{CandidateOutcome, Collector, CycleStats};
pub use config::{CollectorConfig, FeedConfig};
pub use enrichment::Enricher;
pub use poller::{FeedPoller, PollError};
pub use store::{Store, StoreBackend};
pub use types::*;
