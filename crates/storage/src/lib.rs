//! Persistence for the hash-only interaction log.
//!
//! Only hashes ever cross this boundary; the plaintext utterance and reply
//! stay inside the turn that produced them.

use std::sync::Arc;

use anyhow::{Context, Result};
use care_core::LoggedInteraction;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};

pub trait InteractionLogRepository: Send + Sync {
    async fn record_interaction(
        &self,
        hashed_query: &str,
        hashed_reply: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn recent_interactions(&self, limit: usize) -> Result<Vec<LoggedInteraction>>;

    async fn interactions_by_query_hash(
        &self,
        hashed_query: &str,
        limit: usize,
    ) -> Result<Vec<LoggedInteraction>>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Vec<LoggedInteraction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl InteractionLogRepository for MemoryStore {
    async fn record_interaction(
        &self,
        hashed_query: &str,
        hashed_reply: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.entries.write().push(LoggedInteraction {
            hashed_query: hashed_query.to_string(),
            hashed_reply: hashed_reply.to_string(),
            recorded_at: at,
        });
        Ok(())
    }

    async fn recent_interactions(&self, limit: usize) -> Result<Vec<LoggedInteraction>> {
        let entries = self.entries.read();
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn interactions_by_query_hash(
        &self,
        hashed_query: &str,
        limit: usize,
    ) -> Result<Vec<LoggedInteraction>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.hashed_query == hashed_query)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_logs (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              hashed_query TEXT NOT NULL,
              hashed_reply TEXT NOT NULL,
              recorded_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_logs_query ON chat_logs (hashed_query)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_logs_recorded_at ON chat_logs (recorded_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_interaction(row: sqlx::sqlite::SqliteRow) -> LoggedInteraction {
    LoggedInteraction {
        hashed_query: row.get("hashed_query"),
        hashed_reply: row.get("hashed_reply"),
        recorded_at: row
            .get::<String, _>("recorded_at")
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    }
}

impl InteractionLogRepository for SqliteStore {
    async fn record_interaction(
        &self,
        hashed_query: &str,
        hashed_reply: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chat_logs (hashed_query, hashed_reply, recorded_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(hashed_query)
        .bind(hashed_reply)
        .bind(at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_interactions(&self, limit: usize) -> Result<Vec<LoggedInteraction>> {
        let rows = sqlx::query(
            r#"
            SELECT hashed_query, hashed_reply, recorded_at
            FROM chat_logs
            ORDER BY recorded_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_interaction).collect())
    }

    async fn interactions_by_query_hash(
        &self,
        hashed_query: &str,
        limit: usize,
    ) -> Result<Vec<LoggedInteraction>> {
        let rows = sqlx::query(
            r#"
            SELECT hashed_query, hashed_reply, recorded_at
            FROM chat_logs
            WHERE hashed_query = ?1
            ORDER BY recorded_at DESC
            LIMIT ?2
            "#,
        )
        .bind(hashed_query)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_interaction).collect())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl InteractionLogRepository for Store {
    async fn record_interaction(
        &self,
        hashed_query: &str,
        hashed_reply: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        match self {
            Store::Memory(store) => store.record_interaction(hashed_query, hashed_reply, at).await,
            Store::Sqlite(store) => store.record_interaction(hashed_query, hashed_reply, at).await,
        }
    }

    async fn recent_interactions(&self, limit: usize) -> Result<Vec<LoggedInteraction>> {
        match self {
            Store::Memory(store) => store.recent_interactions(limit).await,
            Store::Sqlite(store) => store.recent_interactions(limit).await,
        }
    }

    async fn interactions_by_query_hash(
        &self,
        hashed_query: &str,
        limit: usize,
    ) -> Result<Vec<LoggedInteraction>> {
        match self {
            Store::Memory(store) => store.interactions_by_query_hash(hashed_query, limit).await,
            Store::Sqlite(store) => store.interactions_by_query_hash(hashed_query, limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_records_and_filters_by_hash() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store.record_interaction("qa", "ra", now).await.unwrap();
        store.record_interaction("qb", "rb", now).await.unwrap();
        store.record_interaction("qa", "rc", now).await.unwrap();

        assert_eq!(store.len(), 3);
        let for_qa = store.interactions_by_query_hash("qa", 10).await.unwrap();
        assert_eq!(for_qa.len(), 2);
        assert!(for_qa.iter().all(|entry| entry.hashed_query == "qa"));
    }

    #[tokio::test]
    async fn recent_interactions_returns_newest_first_and_caps() {
        let store = MemoryStore::new();
        for index in 0..5 {
            store
                .record_interaction(&format!("q{index}"), "r", Utc::now())
                .await
                .unwrap();
        }

        let recent = store.recent_interactions(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].hashed_query, "q4");
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_hashes() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let now = Utc::now();

        store
            .record_interaction("hashed-query", "hashed-reply", now)
            .await
            .unwrap();

        let recent = store.recent_interactions(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].hashed_query, "hashed-query");
        assert_eq!(recent[0].hashed_reply, "hashed-reply");
    }
}
