use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use news_collector::{CachedReads, NewArticle, ReadCache, Store};

async fn memory_store() -> Store {
    let store = Store::connect_sqlite(":memory:")
        .await
        .expect("connect in-memory store");
    store.init_schema().await.expect("init schema");
    store
}

fn article(title: &str, link: &str, topic: &str, fingerprint: &str) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        link: link.to_string(),
        description: String::new(),
        source: "Test Feed".to_string(),
        topic: topic.to_string(),
        added_at: Utc::now(),
        fingerprint: fingerprint.to_string(),
    }
}

#[tokio::test]
async fn insert_if_absent_returns_id_once() {
    let store = memory_store().await;

    let first = store
        .insert_if_absent(&article("Trump wins", "http://a/1", "Trump", "fp-1"))
        .await
        .unwrap();
    assert!(first.is_some());

    // Same fingerprint via a different link: the loser sees None.
    let second = store
        .insert_if_absent(&article("Trump wins", "http://b/other", "Trump", "fp-1"))
        .await
        .unwrap();
    assert!(second.is_none());

    assert_eq!(store.count_articles().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_link_is_also_rejected() {
    let store = memory_store().await;

    store
        .insert_if_absent(&article("Story one", "http://a/x", "Trump", "fp-a"))
        .await
        .unwrap();
    let second = store
        .insert_if_absent(&article("Story two", "http://a/x", "Russia", "fp-b"))
        .await
        .unwrap();

    assert!(second.is_none());
    assert_eq!(store.count_articles().await.unwrap(), 1);
}

#[tokio::test]
async fn exists_by_fingerprint_gates_duplicates() {
    let store = memory_store().await;

    assert!(!store.exists_by_fingerprint("fp-1").await.unwrap());
    store
        .insert_if_absent(&article("Trump wins", "http://a/1", "Trump", "fp-1"))
        .await
        .unwrap();
    assert!(store.exists_by_fingerprint("fp-1").await.unwrap());
}

#[tokio::test]
async fn attach_summary_updates_row_and_ignores_empty_text() {
    let store = memory_store().await;

    let id = store
        .insert_if_absent(&article("Trump wins", "http://a/1", "Trump", "fp-1"))
        .await
        .unwrap()
        .unwrap();

    store.attach_summary(id, "  ").await.unwrap();
    let rows = store.recent_articles(10, 0, None).await.unwrap();
    assert_eq!(rows[0].summary, None);

    store.attach_summary(id, "- headline\n- Matched topic: Trump").await.unwrap();
    let rows = store.recent_articles(10, 0, None).await.unwrap();
    assert_eq!(
        rows[0].summary.as_deref(),
        Some("- headline\n- Matched topic: Trump")
    );
}

#[tokio::test]
async fn recent_articles_orders_by_added_at_desc() {
    let store = memory_store().await;

    let mut older = article("Old story about Trump", "http://a/old", "Trump", "fp-old");
    older.added_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut newer = article("New story about Russia", "http://a/new", "Russia", "fp-new");
    newer.added_at = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

    store.insert_if_absent(&older).await.unwrap();
    store.insert_if_absent(&newer).await.unwrap();

    let rows = store.recent_articles(10, 0, None).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "New story about Russia");
    assert_eq!(rows[1].title, "Old story about Trump");

    let paged = store.recent_articles(1, 1, None).await.unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].title, "Old story about Trump");
}

#[tokio::test]
async fn recent_articles_search_filters_titles() {
    let store = memory_store().await;

    store
        .insert_if_absent(&article("Bitcoin rallies", "http://a/1", "Bitcoin", "fp-1"))
        .await
        .unwrap();
    store
        .insert_if_absent(&article("Court ruling issued", "http://a/2", "Court", "fp-2"))
        .await
        .unwrap();

    let rows = store.recent_articles(10, 0, Some("bitcoin")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Bitcoin rallies");
}

#[tokio::test]
async fn articles_by_topic_is_case_insensitive() {
    let store = memory_store().await;

    store
        .insert_if_absent(&article("Trump wins", "http://a/1", "Trump", "fp-1"))
        .await
        .unwrap();

    let rows = store.articles_by_topic("trump", 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    let rows = store.articles_by_topic("TRUMP", 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    let rows = store.articles_by_topic("russia", 10, 0).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn max_added_at_reflects_newest_row() {
    let store = memory_store().await;
    assert_eq!(store.max_added_at().await.unwrap(), None);

    let mut entry = article("Trump wins", "http://a/1", "Trump", "fp-1");
    entry.added_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    store.insert_if_absent(&entry).await.unwrap();

    let max = store.max_added_at().await.unwrap();
    assert_eq!(max, Some(entry.added_at));
}

#[tokio::test]
async fn cached_reads_serve_stale_within_ttl() {
    let store = Arc::new(memory_store().await);
    let reads = CachedReads::new(store.clone(), ReadCache::new(Duration::from_secs(30)));

    store
        .insert_if_absent(&article("Trump wins", "http://a/1", "Trump", "fp-1"))
        .await
        .unwrap();

    let first = reads.recent_articles(10, 0, None).await;
    assert_eq!(first.len(), 1);

    store
        .insert_if_absent(&article("Russia update", "http://a/2", "Russia", "fp-2"))
        .await
        .unwrap();

    // Within the TTL the cached result is served; staleness is bounded
    // and acceptable.
    let second = reads.recent_articles(10, 0, None).await;
    assert_eq!(second.len(), 1);

    // A different query key bypasses the cached entry.
    let by_topic = reads.articles_by_topic("Russia", 10, 0).await;
    assert_eq!(by_topic.len(), 1);
}
