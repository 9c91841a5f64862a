//! Prompt assembly: fact context block, instruction template and message list.

use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::types::{ChatMessage, Fact, Role};

/// Default number of prior messages replayed to the model.
pub const DEFAULT_HISTORY_TURNS: usize = 6;

/// Role of a chat-completion message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// Render facts as a text block grouped by category, in first-seen order.
///
/// ```text
/// ## Fees
/// - Annual tuition fees: B.Tech: ₹95,000 per year
///   MBA: ₹1,10,000 per year
/// ```
pub fn context_block(facts: &[Fact]) -> String {
    let mut categories: Vec<&str> = Vec::new();
    for fact in facts {
        if !categories.contains(&fact.category.as_str()) {
            categories.push(&fact.category);
        }
    }

    let mut out = String::new();
    for category in categories {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("## ");
        out.push_str(&capitalize(category));
        out.push('\n');
        for fact in facts.iter().filter(|f| f.category == category) {
            out.push_str("- ");
            out.push_str(&fact.title);
            out.push_str(": ");
            out.push_str(&fact.content.replace('\n', "\n  "));
            out.push('\n');
        }
    }
    out
}

/// Wrap the context block in the assistant's instruction template.
pub fn system_prompt(college_name: &str, context: &str, language: Language) -> String {
    let reply_language = match language {
        Language::Hindi => {
            "The user is writing in Hindi. Reply in simple Hindi using Devanagari script, \
             keeping course names, numbers and English proper nouns as they are."
        }
        Language::English => "The user is writing in English. Reply in clear, simple English.",
    };

    format!(
        "You are the friendly information assistant on the official website of {college_name}. \
         You help students and parents with questions about admissions, courses, fees, \
         scholarships, facilities, hostels, placements and contact details.\n\
         \n\
         Rules:\n\
         - Answer only from the college information below. Never invent numbers, dates or names.\n\
         - If the answer is not in the information, say so politely and suggest contacting the \
         admissions office.\n\
         - Keep answers short (at most 3 to 4 sentences) because they may be read aloud.\n\
         - Do not use markdown, tables, emoji or links.\n\
         - {reply_language}\n\
         \n\
         College information:\n\
         {context}"
    )
}

/// Build the chat-completion message list: system prompt, the last
/// `max_history` stored messages, then the new user message.
pub fn build_messages(
    system: String,
    history: &[ChatMessage],
    user_message: &str,
    max_history: usize,
) -> Vec<PromptMessage> {
    let skip = history.len().saturating_sub(max_history);
    let mut messages = Vec::with_capacity(history.len() - skip + 2);
    messages.push(PromptMessage::system(system));
    messages.extend(history[skip..].iter().map(|m| PromptMessage {
        role: m.role.into(),
        content: m.content.clone(),
    }));
    messages.push(PromptMessage::user(user_message));
    messages
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(id: i64, category: &str, title: &str, content: &str) -> Fact {
        Fact {
            id,
            category: category.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    fn message(id: i64, role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            id,
            session_id: "s".into(),
            role,
            content: content.into(),
            language: Language::English,
            created_at: id,
        }
    }

    #[test]
    fn context_groups_by_category_in_first_seen_order() {
        let facts = vec![
            fact(1, "fees", "B.Tech", "₹95,000"),
            fact(2, "contact", "Phone", "+91 141 555 0142"),
            fact(3, "fees", "MBA", "₹1,10,000"),
        ];
        assert_eq!(
            context_block(&facts),
            "## Fees\n- B.Tech: ₹95,000\n- MBA: ₹1,10,000\n\n## Contact\n- Phone: +91 141 555 0142\n"
        );
    }

    #[test]
    fn context_indents_multiline_content() {
        let facts = vec![fact(1, "hostel", "Hostel", "boys: 400 beds\ngirls: 250 beds")];
        assert_eq!(
            context_block(&facts),
            "## Hostel\n- Hostel: boys: 400 beds\n  girls: 250 beds\n"
        );
    }

    #[test]
    fn empty_context() {
        assert_eq!(context_block(&[]), "");
    }

    #[test]
    fn system_prompt_embeds_context_and_language() {
        let hindi = system_prompt("Test College", "## Fees\n- B.Tech: ₹1", Language::Hindi);
        assert!(hindi.contains("Test College"));
        assert!(hindi.ends_with("## Fees\n- B.Tech: ₹1"));
        assert!(hindi.contains("Devanagari"));

        let english = system_prompt("Test College", "", Language::English);
        assert!(english.contains("simple English"));
        assert!(!english.contains("Devanagari"));
    }

    #[test]
    fn messages_keep_only_recent_history() {
        let history: Vec<ChatMessage> = (1..=5)
            .map(|i| {
                let role = if i % 2 == 1 { Role::User } else { Role::Assistant };
                message(i, role, &format!("m{i}"))
            })
            .collect();

        let messages = build_messages("sys".into(), &history, "new question", 2);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], PromptMessage::system("sys"));
        assert_eq!(messages[1].role, PromptRole::Assistant);
        assert_eq!(messages[1].content, "m4");
        assert_eq!(messages[2].role, PromptRole::User);
        assert_eq!(messages[2].content, "m5");
        assert_eq!(messages[3], PromptMessage::user("new question"));
    }

    #[test]
    fn messages_without_history() {
        let messages = build_messages("sys".into(), &[], "hi", DEFAULT_HISTORY_TURNS);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn prompt_message_serializes_openai_style() {
        let json = serde_json::to_value(PromptMessage::user("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));
    }
}
