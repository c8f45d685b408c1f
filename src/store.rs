use std::env;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::types::{Article, NewArticle, Result};

const PG_STATEMENT_TIMEOUT_MS: &str = "5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Postgres,
}

/// The persistence boundary. One store is selected at startup; the two
/// engines differ only inside this module (placeholder syntax, pattern
/// matching case rules), never in calling code.
///
/// The fingerprint unique index is the authoritative dedup key; the link
/// index is best-effort legacy compatibility. Writers treat "already
/// present" as success-via-someone-else.
pub struct Store {
    inner: Inner,
}

enum Inner {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl Store {
    /// Backend selection happens here, once: Postgres when `DATABASE_URL`
    /// is set, otherwise embedded sqlite at `DB_PATH` (default `news.db`).
    pub async fn connect_from_env() -> Result<Self> {
        match env::var("DATABASE_URL") {
            Ok(url) => Self::connect_postgres(&url).await,
            Err(_) => {
                let path = env::var("DB_PATH").unwrap_or_else(|_| "news.db".to_string());
                Self::connect_sqlite(&path).await
            }
        }
    }

    pub async fn connect_postgres(url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(url)
            .map_err(sqlx::Error::from)?
            .application_name("news-collector")
            .options([("statement_timeout", PG_STATEMENT_TIMEOUT_MS)]);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!("Connected to Postgres store");
        Ok(Self {
            inner: Inner::Postgres(pool),
        })
    }

    pub async fn connect_sqlite(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        // A :memory: database exists per connection; keep the pool at one
        // connection so every query sees the same database.
        let max_connections = if path.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        info!("Connected to sqlite store at {}", path);
        Ok(Self {
            inner: Inner::Sqlite(pool),
        })
    }

    pub fn backend(&self) -> StoreBackend {
        match self.inner {
            Inner::Sqlite(_) => StoreBackend::Sqlite,
            Inner::Postgres(_) => StoreBackend::Postgres,
        }
    }

    /// Creates the articles table and its uniqueness indexes if absent.
    /// Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<()> {
        match &self.inner {
            Inner::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS articles (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        title TEXT NOT NULL,
                        link TEXT NOT NULL,
                        description TEXT NOT NULL DEFAULT '',
                        source TEXT NOT NULL DEFAULT '',
                        topic TEXT NOT NULL,
                        summary TEXT,
                        added_at TEXT NOT NULL,
                        fingerprint TEXT NOT NULL
                    )
                    "#,
                )
                .execute(pool)
                .await?;
                sqlx::query(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_fingerprint ON articles(fingerprint)",
                )
                .execute(pool)
                .await?;
                sqlx::query(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_link ON articles(link)",
                )
                .execute(pool)
                .await?;
            }
            Inner::Postgres(pool) => {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS articles (
                        id BIGSERIAL PRIMARY KEY,
                        title TEXT NOT NULL,
                        link TEXT NOT NULL,
                        description TEXT NOT NULL DEFAULT '',
                        source TEXT NOT NULL DEFAULT '',
                        topic TEXT NOT NULL,
                        summary TEXT,
                        added_at TIMESTAMPTZ NOT NULL,
                        fingerprint TEXT NOT NULL
                    )
                    "#,
                )
                .execute(pool)
                .await?;
                sqlx::query(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_fingerprint ON articles(fingerprint)",
                )
                .execute(pool)
                .await?;
                sqlx::query(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_link ON articles(link)",
                )
                .execute(pool)
                .await?;
            }
        }
        info!("Store schema ready");
        Ok(())
    }

    /// The pre-enrichment gate: checked before any enrichment work.
    pub async fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool> {
        let found = match &self.inner {
            Inner::Sqlite(pool) => {
                sqlx::query("SELECT 1 FROM articles WHERE fingerprint = ?")
                    .bind(fingerprint)
                    .fetch_optional(pool)
                    .await?
                    .is_some()
            }
            Inner::Postgres(pool) => {
                sqlx::query("SELECT 1 FROM articles WHERE fingerprint = $1")
                    .bind(fingerprint)
                    .fetch_optional(pool)
                    .await?
                    .is_some()
            }
        };
        Ok(found)
    }

    /// Atomic insert-if-absent keyed on the fingerprint (and, secondarily,
    /// the link) uniqueness constraints. When two writers race, at most one
    /// insert succeeds; the loser gets `None` and must do nothing further.
    /// Summaries start NULL and are attached separately.
    pub async fn insert_if_absent(&self, article: &NewArticle) -> Result<Option<i64>> {
        match &self.inner {
            Inner::Sqlite(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO articles (title, link, description, source, topic, summary, added_at, fingerprint)
                    VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(&article.title)
                .bind(&article.link)
                .bind(&article.description)
                .bind(&article.source)
                .bind(&article.topic)
                .bind(article.added_at)
                .bind(&article.fingerprint)
                .execute(pool)
                .await?;

                if result.rows_affected() == 0 {
                    debug!("Insert skipped, already present: {}", article.link);
                    Ok(None)
                } else {
                    Ok(Some(result.last_insert_rowid()))
                }
            }
            Inner::Postgres(pool) => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO articles (title, link, description, source, topic, summary, added_at, fingerprint)
                    VALUES ($1, $2, $3, $4, $5, NULL, $6, $7)
                    ON CONFLICT DO NOTHING
                    RETURNING id
                    "#,
                )
                .bind(&article.title)
                .bind(&article.link)
                .bind(&article.description)
                .bind(&article.source)
                .bind(&article.topic)
                .bind(article.added_at)
                .bind(&article.fingerprint)
                .fetch_optional(pool)
                .await?;

                match row {
                    Some(row) => Ok(Some(row.try_get::<i64, _>("id")?)),
                    None => {
                        debug!("Insert skipped, already present: {}", article.link);
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Narrow follow-up update attaching a summary to a freshly inserted
    /// row. A no-op for empty text.
    pub async fn attach_summary(&self, id: i64, summary: &str) -> Result<()> {
        if summary.trim().is_empty() {
            return Ok(());
        }
        match &self.inner {
            Inner::Sqlite(pool) => {
                sqlx::query("UPDATE articles SET summary = ? WHERE id = ?")
                    .bind(summary)
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            Inner::Postgres(pool) => {
                sqlx::query("UPDATE articles SET summary = $1 WHERE id = $2")
                    .bind(summary)
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
        }
        Ok(())
    }

    /// Most recent articles, optionally filtered by a case-insensitive
    /// search over title, topic, and summary.
    pub async fn recent_articles(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<Article>> {
        match &self.inner {
            Inner::Sqlite(pool) => {
                let rows = if let Some(term) = search {
                    let pattern = format!("%{term}%");
                    sqlx::query(
                        r#"
                        SELECT id, title, link, description, source, topic, summary, added_at, fingerprint
                        FROM articles
                        WHERE title LIKE ? OR topic LIKE ? OR summary LIKE ?
                        ORDER BY added_at DESC
                        LIMIT ? OFFSET ?
                        "#,
                    )
                    .bind(&pattern)
                    .bind(&pattern)
                    .bind(&pattern)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
                } else {
                    sqlx::query(
                        r#"
                        SELECT id, title, link, description, source, topic, summary, added_at, fingerprint
                        FROM articles
                        ORDER BY added_at DESC
                        LIMIT ? OFFSET ?
                        "#,
                    )
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
                };
                rows.iter().map(article_from_sqlite_row).collect()
            }
            Inner::Postgres(pool) => {
                let rows = if let Some(term) = search {
                    let pattern = format!("%{term}%");
                    sqlx::query(
                        r#"
                        SELECT id, title, link, description, source, topic, summary, added_at, fingerprint
                        FROM articles
                        WHERE title ILIKE $1 OR topic ILIKE $1 OR summary ILIKE $1
                        ORDER BY added_at DESC
                        LIMIT $2 OFFSET $3
                        "#,
                    )
                    .bind(&pattern)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
                } else {
                    sqlx::query(
                        r#"
                        SELECT id, title, link, description, source, topic, summary, added_at, fingerprint
                        FROM articles
                        ORDER BY added_at DESC
                        LIMIT $1 OFFSET $2
                        "#,
                    )
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
                };
                rows.iter().map(article_from_pg_row).collect()
            }
        }
    }

    /// Articles for one topic label, case-insensitive on the label.
    pub async fn articles_by_topic(
        &self,
        topic: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>> {
        match &self.inner {
            Inner::Sqlite(pool) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id, title, link, description, source, topic, summary, added_at, fingerprint
                    FROM articles
                    WHERE lower(topic) = lower(?)
                    ORDER BY added_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(topic)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?;
                rows.iter().map(article_from_sqlite_row).collect()
            }
            Inner::Postgres(pool) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id, title, link, description, source, topic, summary, added_at, fingerprint
                    FROM articles
                    WHERE lower(topic) = lower($1)
                    ORDER BY added_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(topic)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?;
                rows.iter().map(article_from_pg_row).collect()
            }
        }
    }

    /// Timestamp of the newest stored article, if any.
    pub async fn max_added_at(&self) -> Result<Option<DateTime<Utc>>> {
        let value = match &self.inner {
            Inner::Sqlite(pool) => {
                sqlx::query_scalar::<_, Option<DateTime<Utc>>>("SELECT MAX(added_at) FROM articles")
                    .fetch_one(pool)
                    .await?
            }
            Inner::Postgres(pool) => {
                sqlx::query_scalar::<_, Option<DateTime<Utc>>>("SELECT MAX(added_at) FROM articles")
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(value)
    }

    pub async fn count_articles(&self) -> Result<i64> {
        let count = match &self.inner {
            Inner::Sqlite(pool) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
                    .fetch_one(pool)
                    .await?
            }
            Inner::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(count)
    }
}

fn article_from_sqlite_row(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        link: row.try_get("link")?,
        description: row.try_get("description")?,
        source: row.try_get("source")?,
        topic: row.try_get("topic")?,
        summary: row.try_get("summary")?,
        added_at: row.try_get("added_at")?,
        fingerprint: row.try_get("fingerprint")?,
    })
}

fn article_from_pg_row(row: &PgRow) -> Result<Article> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        link: row.try_get("link")?,
        description: row.try_get("description")?,
        source: row.try_get("source")?,
        topic: row.try_get("topic")?,
        summary: row.try_get("summary")?,
        added_at: row.try_get("added_at")?,
        fingerprint: row.try_get("fingerprint")?,
    })
}
