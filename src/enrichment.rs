use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::CollectorConfig;
use crate::text;
use crate::types::CandidateRecord;

/// Context handed to the summarizer is capped so a long article page does
/// not blow up the request.
const MAX_CONTEXT_CHARS: usize = 12_000;
/// Remote results shorter than this are treated as garbage.
const MIN_REMOTE_SUMMARY_CHARS: usize = 20;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run regex"));

/// Produces summaries for enrichment-eligible candidates. Never errors:
/// a failing page fetch degrades to snippet-only context, a failing
/// summarizer degrades to the deterministic local fallback.
pub struct Enricher {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    eligible_topics: HashSet<String>,
}

impl Enricher {
    pub fn new(config: &CollectorConfig) -> Self {
        let client = Client::builder()
            .user_agent("news-collector/0.1")
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.summary_api_url.clone(),
            api_key: config.summary_api_key.clone(),
            model: config.summary_model.clone(),
            eligible_topics: config.enrichment_topics.clone(),
        }
    }

    /// Whether the matched topic key gets a summary at all. Most topics
    /// do not; the subset is configuration, not code.
    pub fn is_eligible(&self, topic_key: &str) -> bool {
        self.eligible_topics.contains(topic_key)
    }

    /// Returns a non-empty sanitized summary or `None`. The caller treats
    /// `None` as "store no summary", never as an error.
    pub async fn enrich(
        &self,
        candidate: &CandidateRecord,
        topic_label: &str,
        feed_name: &str,
    ) -> Option<String> {
        // Best-effort richer context; the feed snippet is the floor.
        let mut context = if self.api_key.is_some() {
            self.fetch_page_text(&candidate.link).await
        } else {
            String::new()
        };
        if context.is_empty() {
            context = candidate.description.clone();
        }
        if context.chars().count() > MAX_CONTEXT_CHARS {
            context = context.chars().take(MAX_CONTEXT_CHARS).collect();
        }

        let remote = self
            .summarize_remote(&candidate.title, &context, topic_label, feed_name)
            .await;

        let chosen = match remote {
            Some(summary) if summary.trim().len() >= MIN_REMOTE_SUMMARY_CHARS => summary,
            _ => fallback_summary(&candidate.title, &candidate.description, topic_label),
        };

        let sanitized = sanitize_summary(&chosen);
        if sanitized.is_empty() {
            None
        } else {
            Some(sanitized)
        }
    }

    /// Best-effort extraction of the linked page's paragraph text. Any
    /// fetch or parse failure yields an empty string.
    async fn fetch_page_text(&self, url: &str) -> String {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("Page fetch failed for {}: {}", url, e);
                return String::new();
            }
        };
        if !response.status().is_success() {
            debug!("Page fetch for {} returned {}", url, response.status());
            return String::new();
        }
        match response.text().await {
            Ok(html) => extract_paragraph_text(&html),
            Err(e) => {
                debug!("Page body read failed for {}: {}", url, e);
                String::new()
            }
        }
    }

    async fn summarize_remote(
        &self,
        title: &str,
        context: &str,
        topic_label: &str,
        feed_name: &str,
    ) -> Option<String> {
        let api_key = self.api_key.as_deref()?;

        let prompt = format!(
            "Summarize this article in 5 bullet points.\n\
             Keep it short. Paraphrase. End with: Why it matters: ...\n\n\
             Title: {title}\nTopic: {topic_label}\nSource: {feed_name}\n\nText:\n{context}"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&json!({ "model": self.model, "input": prompt }))
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Summarizer returned {} for '{}'", r.status(), title);
                return None;
            }
            Err(e) => {
                warn!("Summarizer request failed for '{}': {}", title, e);
                return None;
            }
        };

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Summarizer response was not JSON: {}", e);
                return None;
            }
        };

        let text = extract_output_text(&body);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// Responses-API shape: either a flat "output_text" field or an "output"
// list whose content items carry the text.
fn extract_output_text(body: &Value) -> String {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return text.to_string();
    }

    let mut parts = Vec::new();
    if let Some(output) = body.get("output").and_then(Value::as_array) {
        for item in output {
            if let Some(content) = item.get("content").and_then(Value::as_array) {
                for chunk in content {
                    if chunk.get("type").and_then(Value::as_str) == Some("output_text") {
                        if let Some(text) = chunk.get("text").and_then(Value::as_str) {
                            parts.push(text.to_string());
                        }
                    }
                }
            }
        }
    }
    parts.join("\n")
}

fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    let mut out = String::new();
    for element in document.select(&selector) {
        let paragraph = element.text().collect::<Vec<_>>().join(" ");
        let paragraph = paragraph.trim();
        if !paragraph.is_empty() {
            out.push_str(paragraph);
            out.push(' ');
        }
    }
    out.trim().to_string()
}

/// Deterministic local summary used whenever the external collaborator is
/// absent, failing, or returns garbage: a headline bullet, at most one
/// informative sentence from the snippet, and a fixed topic note.
pub fn fallback_summary(title: &str, description: &str, topic_label: &str) -> String {
    let title_norm = text::normalize_for_match(title);
    let desc_clean = text::clean(description);

    let mut bullets = vec![format!("- {title_norm}")];

    let mut added_detail = false;
    if desc_clean.len() > 30 {
        for sentence in desc_clean.split(['.', '!', '?']) {
            let sentence = sentence.trim();
            if sentence.len() > 15 && !resembles(&sentence.to_lowercase(), &title_norm) {
                bullets.push(format!("- {sentence}"));
                added_detail = true;
                break;
            }
        }
    }
    if !added_detail {
        bullets.push("- No additional detail was available in the feed snippet.".to_string());
    }

    bullets.push(format!("- Matched topic: {topic_label}"));
    bullets.push(
        "Why it matters: This may be relevant to your tracked topic; open the link for full details."
            .to_string(),
    );

    bullets.join("\n")
}

// Word-set Dice coefficient; a snippet sentence that mostly restates the
// headline adds nothing.
fn resembles(sentence: &str, title: &str) -> bool {
    let sentence_words: HashSet<&str> = sentence.split_whitespace().collect();
    let title_words: HashSet<&str> = title.split_whitespace().collect();
    if sentence_words.is_empty() || title_words.is_empty() {
        return false;
    }
    let shared = sentence_words.intersection(&title_words).count();
    let dice = (2 * shared) as f64 / (sentence_words.len() + title_words.len()) as f64;
    dice > 0.55
}

/// Converts HTML line-break markers to plain newlines, strips remaining
/// tags, normalizes line endings, and collapses excessive blank runs.
/// Stored summaries are never raw HTML.
pub fn sanitize_summary(summary: &str) -> String {
    let text = summary.replace("\r\n", "\n").replace('\r', "\n");
    let text = BR_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect();
    let joined = lines.join("\n");
    BLANK_RUN_RE.replace_all(&joined, "\n\n").trim().to_string()
}
