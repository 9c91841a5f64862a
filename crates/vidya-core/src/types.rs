//! Shared types for the vidya chat backend.
//!
//! Records handed between the fact store, the storage backends and the HTTP
//! layer. Keeping them here lets the storage crate and the CLI agree on the
//! JSON shape without pulling in tokio or sqlx.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::language::Language;

// ─── College facts ─────────────────────────────────────────────────────────

/// One informational record about the college.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub id: i64,
    pub category: String,
    pub title: String,
    pub content: String,
}

/// A fact before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFact {
    pub category: String,
    pub title: String,
    pub content: String,
}

impl NewFact {
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Trim all fields and reject blanks.
    pub fn normalized(self) -> Result<Self, InvalidFact> {
        let category = self.category.trim().to_lowercase();
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();
        if category.is_empty() {
            return Err(InvalidFact("category"));
        }
        if title.is_empty() {
            return Err(InvalidFact("title"));
        }
        if content.is_empty() {
            return Err(InvalidFact("content"));
        }
        Ok(Self {
            category,
            title,
            content,
        })
    }
}

/// A required fact field was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("fact field '{0}' must not be empty")]
pub struct InvalidFact(pub &'static str);

// ─── Chat messages ─────────────────────────────────────────────────────────

/// Author of a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub language: Language,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// A chat message before it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub language: Language,
}

/// Where an assistant reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    /// Generated by the chat-completion model.
    Model,
    /// Canned keyword-matched reply used when the model call failed.
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fact_normalizes_fields() {
        let fact = NewFact::new("  Fees ", " B.Tech ", " ₹95,000 per year ")
            .normalized()
            .unwrap();
        assert_eq!(fact.category, "fees");
        assert_eq!(fact.title, "B.Tech");
        assert_eq!(fact.content, "₹95,000 per year");
    }

    #[test]
    fn new_fact_rejects_blank_fields() {
        assert_eq!(
            NewFact::new(" ", "t", "c").normalized(),
            Err(InvalidFact("category"))
        );
        assert_eq!(
            NewFact::new("c", "", "c").normalized(),
            Err(InvalidFact("title"))
        );
        assert_eq!(
            NewFact::new("c", "t", "\n").normalized(),
            Err(InvalidFact("content"))
        );
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::Assistant] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn chat_message_serializes_camel_case() {
        let msg = ChatMessage {
            id: 1,
            session_id: "s1".into(),
            role: Role::Assistant,
            content: "Hello".into(),
            language: Language::English,
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["language"], "en");
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
    }
}
