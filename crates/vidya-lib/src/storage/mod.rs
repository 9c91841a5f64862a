//! Persistence for chat messages and college facts.
//!
//! Flat operations only: append, list, filter, search. Two interchangeable
//! backends implement [`Storage`]: [`MemoryStorage`] (default) and
//! [`SqliteStorage`] (when a `sqlite:` database URL is configured).

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use vidya_core::facts::FactStore;
use vidya_core::types::{ChatMessage, Fact, NewChatMessage, NewFact};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

/// Storage backend for chat history and college facts.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Backend identifier ("memory" or "sqlite").
    fn kind(&self) -> &'static str;

    /// Append a chat message, stamping id and creation time.
    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, StorageError>;

    /// All messages of a session, oldest first.
    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError>;

    /// Every fact, in insertion order.
    async fn all_facts(&self) -> Result<Vec<Fact>, StorageError>;

    /// Facts whose category equals `category`, ignoring case.
    async fn facts_by_category(&self, category: &str) -> Result<Vec<Fact>, StorageError>;

    /// Case-insensitive substring search over title, content and category.
    async fn search_facts(&self, query: &str) -> Result<Vec<Fact>, StorageError>;

    /// Append a fact. The caller is expected to have normalized it.
    async fn create_fact(&self, fact: NewFact) -> Result<Fact, StorageError>;
}

/// Open the configured backend, seeding facts from `facts`.
pub async fn open(
    database_url: Option<&str>,
    facts: FactStore,
) -> Result<Arc<dyn Storage>, StorageError> {
    match database_url {
        Some(url) => {
            let storage = SqliteStorage::connect(url).await?;
            let seeded = storage.seed_facts(facts.all()).await?;
            info!("storage: sqlite at {url} ({seeded} facts seeded)");
            Ok(Arc::new(storage))
        }
        None => {
            info!("storage: in-memory ({} facts)", facts.len());
            Ok(Arc::new(MemoryStorage::new(facts)))
        }
    }
}

/// Current time as Unix epoch milliseconds.
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_facts() -> FactStore {
        FactStore::from_json(
            r#"[
                {"category": "fees", "title": "B.Tech", "content": "₹95,000 per year"},
                {"category": "hostel", "title": "Girls hostel", "content": "250 beds"}
            ]"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn database_url_selects_sqlite() {
        let storage = open(Some("sqlite::memory:"), sample_facts()).await.unwrap();
        assert_eq!(storage.kind(), "sqlite");
        assert_eq!(storage.all_facts().await.unwrap(), sample_facts().all().to_vec());
    }

    #[tokio::test]
    async fn no_database_url_selects_memory() {
        let storage = open(None, sample_facts()).await.unwrap();
        assert_eq!(storage.kind(), "memory");
        assert_eq!(storage.all_facts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn backends_fold_case_the_same_way() {
        let backends = [
            open(None, sample_facts()).await.unwrap(),
            open(Some("sqlite::memory:"), sample_facts()).await.unwrap(),
        ];

        for storage in &backends {
            storage
                .create_fact(NewFact::new("études", "École exchange", "Semester in Lyon"))
                .await
                .unwrap();

            let kind = storage.kind();
            assert_eq!(storage.search_facts("école").await.unwrap().len(), 1, "{kind}");
            assert_eq!(storage.search_facts("ÉCOLE").await.unwrap().len(), 1, "{kind}");
            assert_eq!(storage.facts_by_category("ÉTUDES").await.unwrap().len(), 1, "{kind}");
            assert_eq!(storage.search_facts("GIRLS").await.unwrap().len(), 1, "{kind}");
            assert!(storage.search_facts(" ").await.unwrap().is_empty(), "{kind}");
        }
    }
}
