use sha2::{Digest, Sha256};

use crate::text;

/// Separator between the normalized title and the topic key. Part of the
/// identity definition; never change it for an existing store.
const SEPARATOR: &str = "|";

/// Derives the stable content identity for a story: SHA-256 over the
/// normalized title joined with the lowercased topic key.
///
/// The same story arriving via two feeds, under a rewritten aggregator URL,
/// or re-served on the next poll cycle collapses to one fingerprint. Two
/// genuinely different stories with near-identical headlines on the same
/// topic also collapse; that false-dedup risk is an accepted policy choice.
pub fn fingerprint(title: &str, topic_key: &str) -> String {
    let normalized = text::normalize_for_match(title);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(SEPARATOR.as_bytes());
    hasher.update(topic_key.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}
