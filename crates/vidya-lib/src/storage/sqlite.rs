//! SQLite storage backend.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use vidya_core::facts::{filter_by_category, search_facts};
use vidya_core::types::{ChatMessage, Fact, NewChatMessage, NewFact};

use super::{Storage, StorageError, now_millis};

type MessageRow = (i64, String, String, String, String, i64);
type FactRow = (i64, String, String, String);

/// SQLite-backed storage.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect to `url` (e.g. `sqlite:vidya.db` or `sqlite::memory:`),
    /// creating the file and schema when missing.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every connection to `:memory:` is a separate database.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };
        Self::init(&pool).await?;
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init(pool: &SqlitePool) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_messages (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT    NOT NULL,
                role       TEXT    NOT NULL,
                content    TEXT    NOT NULL,
                language   TEXT    NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_session
             ON chat_messages (session_id, id)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS college_info (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                title    TEXT NOT NULL,
                content  TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert `facts` when the fact table is empty. Returns how many were inserted.
    pub async fn seed_facts(&self, facts: &[Fact]) -> Result<usize, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM college_info")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            debug!("sqlite: college_info already has {count} rows, not seeding");
            return Ok(0);
        }

        // All or nothing: a partial seed would never be completed.
        let mut tx = self.pool.begin().await?;
        for fact in facts {
            sqlx::query("INSERT INTO college_info (category, title, content) VALUES (?, ?, ?)")
                .bind(&fact.category)
                .bind(&fact.title)
                .bind(&fact.content)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(facts.len())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, StorageError> {
        let created_at = now_millis();
        let id = sqlx::query(
            "INSERT INTO chat_messages (session_id, role, content, language, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.language.code())
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(ChatMessage {
            id,
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            language: message.language,
            created_at,
        })
    }

    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, session_id, role, content, language, created_at
             FROM chat_messages
             WHERE session_id = ?
             ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(message_from_row).collect()
    }

    async fn all_facts(&self) -> Result<Vec<Fact>, StorageError> {
        let rows = sqlx::query_as::<_, FactRow>(
            "SELECT id, category, title, content FROM college_info ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(fact_from_row).collect())
    }

    // Filtering happens in Rust: SQLite's LOWER() and LIKE only fold ASCII,
    // and results must match the in-memory backend.
    async fn facts_by_category(&self, category: &str) -> Result<Vec<Fact>, StorageError> {
        let facts = self.all_facts().await?;
        Ok(filter_by_category(&facts, category).into_iter().cloned().collect())
    }

    async fn search_facts(&self, query: &str) -> Result<Vec<Fact>, StorageError> {
        let facts = self.all_facts().await?;
        Ok(search_facts(&facts, query).into_iter().cloned().collect())
    }

    async fn create_fact(&self, fact: NewFact) -> Result<Fact, StorageError> {
        let id = sqlx::query("INSERT INTO college_info (category, title, content) VALUES (?, ?, ?)")
            .bind(&fact.category)
            .bind(&fact.title)
            .bind(&fact.content)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Fact {
            id,
            category: fact.category,
            title: fact.title,
            content: fact.content,
        })
    }
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, StorageError> {
    let corrupt = |reason: String| StorageError::Corrupt {
        table: "chat_messages",
        reason,
    };
    Ok(ChatMessage {
        id: row.0,
        session_id: row.1,
        role: row.2.parse().map_err(corrupt)?,
        content: row.3,
        language: row.4.parse().map_err(corrupt)?,
        created_at: row.5,
    })
}

fn fact_from_row(row: FactRow) -> Fact {
    Fact {
        id: row.0,
        category: row.1,
        title: row.2,
        content: row.3,
    }
}
