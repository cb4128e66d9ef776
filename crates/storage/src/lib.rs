use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::MessageId;

/// The page tracks exactly one named counter; this is its singleton row id.
const PAGE_VIEW_COUNTER_ID: i64 = 1;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredContactMessage {
    pub message_id: MessageId,
    pub body: String,
    pub reply_to: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Opaque counter interface the rest of the system depends on: an atomic
/// create-or-increment upsert and a read that tolerates row absence.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Creates the counter at 1 if absent, else adds 1, as a single
    /// indivisible statement. Concurrent callers must never lose an
    /// increment.
    async fn increment_visits(&self) -> Result<()>;

    /// Current count, or `None` when no increment has ever committed.
    async fn visit_count(&self) -> Result<Option<u64>>;
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_contact_message(
        &self,
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<StoredContactMessage> {
        let row = sqlx::query(
            "INSERT INTO contact_messages (body, reply_to) VALUES (?, ?)
             RETURNING id, body, reply_to, received_at",
        )
        .bind(body)
        .bind(reply_to)
        .fetch_one(&self.pool)
        .await?;

        Ok(StoredContactMessage {
            message_id: MessageId(row.get::<i64, _>(0)),
            body: row.get::<String, _>(1),
            reply_to: row.get::<Option<String>, _>(2),
            received_at: row.get::<DateTime<Utc>, _>(3),
        })
    }

    /// Newest-first listing for operator review, paginated by message id.
    pub async fn list_contact_messages(
        &self,
        limit: u32,
        before: Option<i64>,
    ) -> Result<Vec<StoredContactMessage>> {
        let rows = if let Some(before_id) = before {
            sqlx::query(
                "SELECT id, body, reply_to, received_at
                 FROM contact_messages
                 WHERE id < ?
                 ORDER BY id DESC
                 LIMIT ?",
            )
            .bind(before_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT id, body, reply_to, received_at
                 FROM contact_messages
                 ORDER BY id DESC
                 LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows
            .into_iter()
            .map(|r| StoredContactMessage {
                message_id: MessageId(r.get::<i64, _>(0)),
                body: r.get::<String, _>(1),
                reply_to: r.get::<Option<String>, _>(2),
                received_at: r.get::<DateTime<Utc>, _>(3),
            })
            .collect())
    }
}

#[async_trait]
impl CounterStore for Storage {
    async fn increment_visits(&self) -> Result<()> {
        sqlx::query(
            "INSERT INTO page_views (id, visit_count) VALUES (?, 1)
             ON CONFLICT(id) DO UPDATE SET visit_count = visit_count + 1",
        )
        .bind(PAGE_VIEW_COUNTER_ID)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn visit_count(&self) -> Result<Option<u64>> {
        let row = sqlx::query("SELECT visit_count FROM page_views WHERE id = ?")
            .bind(PAGE_VIEW_COUNTER_ID)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<i64, _>(0) as u64))
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
