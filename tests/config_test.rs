use news_collector::config;

#[test]
fn default_feeds_are_present_and_named() {
    let feeds = config::default_feeds();
    assert!(!feeds.is_empty());
    assert!(feeds.iter().all(|f| !f.name.is_empty() && !f.url.is_empty()));
    assert!(feeds.iter().any(|f| f.name == "BBC"));
}

#[test]
fn feeds_file_round_trips() {
    let path = std::env::temp_dir().join("news_collector_feeds_ok.json");
    std::fs::write(
        &path,
        r#"[{"name": "BBC", "url": "http://feeds.bbci.co.uk/news/rss.xml"}]"#,
    )
    .unwrap();

    let feeds = config::load_feeds_file(&path).unwrap();
    assert_eq!(feeds.len(), 1);
    assert_eq!(feeds[0].name, "BBC");

    std::fs::remove_file(&path).ok();
}

#[test]
fn feeds_file_rejects_non_http_urls() {
    let path = std::env::temp_dir().join("news_collector_feeds_bad.json");
    std::fs::write(&path, r#"[{"name": "Bad", "url": "ftp://example.com/feed"}]"#).unwrap();

    assert!(config::load_feeds_file(&path).is_err());

    std::fs::remove_file(&path).ok();
}
