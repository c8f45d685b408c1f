use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static INVISIBLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{00a0}\u{200b}\u{200c}\u{200d}]").expect("invisible regex"));
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("punct regex"));

// Aggregator feeds (Google News style) append the publisher to the title,
// which breaks cross-feed identity. Strip a trailing " - Publisher" suffix
// for the publishers we see in practice.
static PUBLISHER_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    let publishers = [
        "Reuters",
        "The Guardian",
        "The New York Times",
        "CNN\\.com",
        "AOL\\.com",
        "AOL",
        "MSN",
        "Facebook",
        "China Daily",
        "The Motley Fool",
        "The Times of Israel",
        "Haaretz",
        "The Globe and Mail",
        "Insider Monkey",
        "Press of Atlantic City",
        "Stock Traders Daily",
    ]
    .join("|");
    Regex::new(&format!(
        r"(?i)\s*(?:-|\||\u{{2013}}|\u{{2014}})?\s*(?:{publishers})$"
    ))
    .expect("publisher suffix regex")
});

/// Strips markup and entities from raw feed text and collapses whitespace.
/// Total: any input maps to a (possibly empty) plain-text string.
pub fn clean(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = TAG_RE.replace_all(text, "");
    let text = decode_entities(&text);
    let text = INVISIBLE_RE.replace_all(&text, " ");
    let text = PUBLISHER_SUFFIX_RE.replace(&text, "");
    let text = WS_RE.replace_all(&text, " ");
    collapse_repeated_words(text.trim())
}

/// Canonical lowercase form used for topic matching and fingerprinting:
/// `clean` plus lowercasing and punctuation removal. This variant is frozen;
/// changing it would silently break dedup against already-stored rows.
pub fn normalize_for_match(text: &str) -> String {
    let cleaned = clean(text).to_lowercase();
    let stripped = PUNCT_RE.replace_all(&cleaned, "");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

// Some feeds double up words when they inline the title into the snippet
// ("Breaking Breaking news"). Drop immediately repeated words.
fn collapse_repeated_words(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for word in text.split(' ') {
        if out.last() != Some(&word) {
            out.push(word);
        }
    }
    out.join(" ")
}
