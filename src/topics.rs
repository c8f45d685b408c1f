/// Fixed, ordered topic vocabulary. Order matters: the first key that
/// matches wins, so this list doubles as the tie-break policy.
pub const TOPICS: &[&str] = &[
    "election",
    "trump",
    "bitcoin",
    "russia",
    "putin",
    "israel",
    "saudi",
    "tulsi",
    "intelligence community",
    "fbi",
    "executive order",
    "china",
    "dni",
    "maduro",
    "lawsuit",
    "injunction",
    "court",
    "voter",
    "rico",
    "conspiracy",
    "corruption",
    "election fraud",
    "conspiracy theory",
    "qanon",
    "ufo",
    "nuclear",
    "maha",
    "netanyahu",
    "erdogan",
    "lavrov",
    "iran",
    "board of peace",
    "congo",
    "sahel",
];

/// Returns the first topic key appearing as a substring of either the
/// normalized title or the normalized description. Inputs must already be
/// passed through `text::normalize_for_match`.
pub fn match_topic(norm_title: &str, norm_desc: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .copied()
        .find(|topic| norm_title.contains(topic) || norm_desc.contains(topic))
}

/// Maps a topic key to its fixed display form. Acronyms and multi-word
/// phrases are special-cased; short already-uppercase tokens pass through;
/// everything else is title-cased per word.
pub fn canonical_label(key: &str) -> String {
    match key {
        "fbi" => return "FBI".to_string(),
        "dni" => return "DNI".to_string(),
        "ufo" => return "UFO".to_string(),
        "rico" => return "RICO".to_string(),
        "maha" => return "MAHA".to_string(),
        "qanon" => return "QAnon".to_string(),
        "intelligence community" => return "Intelligence Community".to_string(),
        "executive order" => return "Executive Order".to_string(),
        "election fraud" => return "Election Fraud".to_string(),
        "conspiracy theory" => return "Conspiracy Theory".to_string(),
        "board of peace" => return "Board of Peace".to_string(),
        _ => {}
    }

    // Short tokens that are already all caps stay as-is (e.g. a "NATO"
    // key added via configuration).
    if key.len() <= 4 && !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase()) {
        return key.to_string();
    }

    key.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
