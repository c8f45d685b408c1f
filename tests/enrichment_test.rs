use news_collector::enrichment::{fallback_summary, sanitize_summary};

#[test]
fn sanitize_converts_break_markup_to_newlines() {
    let raw = "- point one<br>- point two<br/>- point three<BR />done";
    let sanitized = sanitize_summary(raw);
    assert_eq!(sanitized, "- point one\n- point two\n- point three\ndone");
}

#[test]
fn sanitize_strips_remaining_tags() {
    let raw = "<div>Summary <b>bold</b> text</div>";
    let sanitized = sanitize_summary(raw);
    assert!(!sanitized.contains('<'));
    assert_eq!(sanitized, "Summary bold text");
}

#[test]
fn sanitize_normalizes_line_endings_and_blank_runs() {
    let raw = "first\r\nsecond\r\n\n\n\n\nthird";
    assert_eq!(sanitize_summary(raw), "first\nsecond\n\nthird");
}

#[test]
fn fallback_is_deterministic() {
    let a = fallback_summary(
        "Trump signs new executive order",
        "The order covers federal hiring practices and takes effect in March.",
        "Trump",
    );
    let b = fallback_summary(
        "Trump signs new executive order",
        "The order covers federal hiring practices and takes effect in March.",
        "Trump",
    );
    assert_eq!(a, b);
}

#[test]
fn fallback_includes_headline_topic_and_detail() {
    let summary = fallback_summary(
        "Trump signs new executive order",
        "The order covers federal hiring practices and takes effect in March.",
        "Trump",
    );
    assert!(summary.contains("- trump signs new executive order"));
    assert!(summary.contains("- The order covers federal hiring practices"));
    assert!(summary.contains("- Matched topic: Trump"));
    assert!(summary.starts_with('-'));
    assert!(summary.contains("Why it matters:"));
}

#[test]
fn fallback_notes_missing_detail_for_short_snippets() {
    let summary = fallback_summary("Trump signs new executive order", "", "Trump");
    assert!(summary.contains("No additional detail was available"));
}

#[test]
fn fallback_skips_sentences_that_restate_the_headline() {
    let summary = fallback_summary(
        "Trump signs new executive order",
        "Trump signs new executive order. Officials said the measure reshapes agency budgets next year.",
        "Trump",
    );
    assert!(summary.contains("Officials said the measure reshapes agency budgets"));
    // The restated headline must not appear as the detail bullet.
    assert_eq!(summary.matches("- Trump signs new executive order").count(), 0);
}

#[test]
fn fallback_output_survives_sanitization_unchanged() {
    let summary = fallback_summary(
        "Bitcoin climbs after ETF approval",
        "Spot trading volume doubled within hours of the announcement.",
        "Bitcoin",
    );
    assert_eq!(sanitize_summary(&summary), summary);
}
