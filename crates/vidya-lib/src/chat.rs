//! Chat turn handling: persist, prompt, complete, fall back, persist.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use vidya_core::fallback::fallback_reply;
use vidya_core::language::{Language, detect_language};
use vidya_core::prompt::{build_messages, context_block, system_prompt};
use vidya_core::types::{NewChatMessage, ReplySource, Role};

use crate::config::ChatConfig;
use crate::llm::ChatModel;
use crate::storage::{Storage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message is longer than {max} characters")]
    MessageTooLong { max: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The assistant's answer to one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
    pub language: Language,
    pub source: ReplySource,
}

pub struct ChatService {
    storage: Arc<dyn Storage>,
    model: Arc<dyn ChatModel>,
    college_name: String,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(
        storage: Arc<dyn Storage>,
        model: Arc<dyn ChatModel>,
        college_name: impl Into<String>,
        config: ChatConfig,
    ) -> Self {
        Self {
            storage,
            model,
            college_name: college_name.into(),
            config,
        }
    }

    /// Answer `message` within `session_id`.
    ///
    /// Once the message is valid and stored, a reply always comes back: a
    /// failed or unconfigured model is replaced by a canned answer. Only
    /// storage failures surface as errors.
    pub async fn reply(&self, session_id: &str, message: &str) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let max = self.config.max_message_chars;
        if message.chars().count() > max {
            return Err(ChatError::MessageTooLong { max });
        }

        let language = detect_language(message);
        let stored = self
            .storage
            .create_message(NewChatMessage {
                session_id: session_id.to_string(),
                role: Role::User,
                content: message.to_string(),
                language,
            })
            .await?;

        let history: Vec<_> = self
            .storage
            .messages_for_session(session_id)
            .await?
            .into_iter()
            .filter(|m| m.id != stored.id)
            .collect();
        let facts = self.storage.all_facts().await?;

        let system = system_prompt(&self.college_name, &context_block(&facts), language);
        let messages = build_messages(system, &history, message, self.config.history_turns);
        debug!(
            "chat[{session_id}]: {} facts, {} history messages, language {language}",
            facts.len(),
            history.len()
        );

        let (reply, reply_language, source) = if self.model.is_configured() {
            match self.model.complete(&messages).await {
                Ok(text) => {
                    let lang = detect_language(&text);
                    (text, lang, ReplySource::Model)
                }
                Err(e) => {
                    warn!("chat[{session_id}]: {} failed, using canned reply: {e}", self.model.id());
                    let canned = fallback_reply(message);
                    (canned.text.to_string(), canned.language, ReplySource::Fallback)
                }
            }
        } else {
            debug!("chat[{session_id}]: {} not configured, using canned reply", self.model.id());
            let canned = fallback_reply(message);
            (canned.text.to_string(), canned.language, ReplySource::Fallback)
        };

        self.storage
            .create_message(NewChatMessage {
                session_id: session_id.to_string(),
                role: Role::Assistant,
                content: reply.clone(),
                language: reply_language,
            })
            .await?;

        info!("chat[{session_id}]: replied ({source:?}, {reply_language})");
        Ok(ChatReply {
            reply,
            session_id: session_id.to_string(),
            language: reply_language,
            source,
        })
    }
}
