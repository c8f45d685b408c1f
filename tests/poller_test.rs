use news_collector::poller::{extract_candidates, PollError};

const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>http://example.com</link>
    <description>Sample</description>
    <item>
      <title>Trump signs &lt;b&gt;new&lt;/b&gt; executive order</title>
      <link>http://example.com/story-1</link>
      <description>&lt;p&gt;The order takes effect in March.&lt;/p&gt;</description>
      <pubDate>Mon, 17 Aug 2026 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Entry without a link</title>
      <description>Should be dropped.</description>
    </item>
    <item>
      <title>Bitcoin rallies past 100k</title>
      <link>http://example.com/story-2</link>
    </item>
  </channel>
</rss>"#;

#[test]
fn extracts_cleaned_candidates_and_skips_linkless_entries() {
    let candidates = extract_candidates(SAMPLE_RSS).unwrap();
    assert_eq!(candidates.len(), 2);

    assert_eq!(candidates[0].title, "Trump signs new executive order");
    assert_eq!(candidates[0].link, "http://example.com/story-1");
    assert_eq!(candidates[0].description, "The order takes effect in March.");
    assert!(!candidates[0].publish_date_text.is_empty());

    assert_eq!(candidates[1].title, "Bitcoin rallies past 100k");
    assert_eq!(candidates[1].description, "");
    assert_eq!(candidates[1].publish_date_text, "");
}

#[test]
fn zero_entry_feed_is_reported_as_empty() {
    let feed = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
    assert!(matches!(extract_candidates(feed), Err(PollError::Empty)));
}

#[test]
fn malformed_content_is_reported_as_parse_error() {
    let result = extract_candidates("this is not a feed");
    assert!(matches!(result, Err(PollError::Parse(_))));
}
