//! In-memory storage backend.

use async_trait::async_trait;
use tokio::sync::RwLock;

use vidya_core::facts::FactStore;
use vidya_core::types::{ChatMessage, Fact, NewChatMessage, NewFact};

use super::{Storage, StorageError, now_millis};

/// Vectors behind async locks. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    facts: RwLock<FactStore>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl MemoryStorage {
    pub fn new(facts: FactStore) -> Self {
        Self {
            facts: RwLock::new(facts),
            messages: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn create_message(&self, message: NewChatMessage) -> Result<ChatMessage, StorageError> {
        let mut messages = self.messages.write().await;
        let stored = ChatMessage {
            id: messages.last().map_or(1, |m| m.id + 1),
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            language: message.language,
            created_at: now_millis(),
        };
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn all_facts(&self) -> Result<Vec<Fact>, StorageError> {
        Ok(self.facts.read().await.all().to_vec())
    }

    async fn facts_by_category(&self, category: &str) -> Result<Vec<Fact>, StorageError> {
        Ok(self
            .facts
            .read()
            .await
            .by_category(category)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn search_facts(&self, query: &str) -> Result<Vec<Fact>, StorageError> {
        Ok(self
            .facts
            .read()
            .await
            .search(query)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn create_fact(&self, fact: NewFact) -> Result<Fact, StorageError> {
        Ok(self.facts.write().await.push(fact).clone())
    }
}
