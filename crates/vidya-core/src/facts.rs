//! In-memory fact store: the college knowledge used as chat context.
//!
//! Records are loaded once from JSON (the bundled `data/college_info.json`
//! unless a replacement file is configured) and only ever appended to.
//! Lookups are linear scans; the list is a few dozen entries.
//!
//! A record's `content` may be a string or any structured JSON value.
//! Structured content is flattened to `key: value` lines by [`flatten_json`]
//! so it can be dropped straight into a prompt.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Fact, InvalidFact, NewFact};

/// The college facts compiled into the binary.
pub const BUNDLED_FACTS: &str = include_str!("../data/college_info.json");

#[derive(Debug, thiserror::Error)]
pub enum FactsError {
    #[error("invalid fact JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fact #{index}: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: InvalidFact,
    },
}

#[derive(Deserialize)]
struct RawFact {
    category: String,
    title: String,
    content: Value,
}

/// Append-only list of college facts.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: Vec<Fact>,
}

impl FactStore {
    /// Load the facts bundled with the crate.
    pub fn bundled() -> Result<Self, FactsError> {
        Self::from_json(BUNDLED_FACTS)
    }

    /// Parse a JSON array of `{category, title, content}` records.
    pub fn from_json(json: &str) -> Result<Self, FactsError> {
        let raw: Vec<RawFact> = serde_json::from_str(json)?;
        let mut store = Self::default();
        for (index, record) in raw.into_iter().enumerate() {
            let new = NewFact::new(record.category, record.title, flatten_json(&record.content))
                .normalized()
                .map_err(|source| FactsError::Invalid { index, source })?;
            store.push(new);
        }
        Ok(store)
    }

    /// Append a fact, assigning the next sequential id.
    pub fn push(&mut self, new: NewFact) -> &Fact {
        let id = self.facts.last().map_or(1, |f| f.id + 1);
        self.facts.push(Fact {
            id,
            category: new.category,
            title: new.title,
            content: new.content,
        });
        &self.facts[self.facts.len() - 1]
    }

    /// Every record, in insertion order.
    pub fn all(&self) -> &[Fact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Records whose category equals `category`, ignoring case.
    pub fn by_category(&self, category: &str) -> Vec<&Fact> {
        filter_by_category(&self.facts, category)
    }

    /// Case-insensitive substring search over title, content and category.
    pub fn search(&self, query: &str) -> Vec<&Fact> {
        search_facts(&self.facts, query)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for fact in &self.facts {
            if !seen.contains(&fact.category.as_str()) {
                seen.push(&fact.category);
            }
        }
        seen
    }
}

/// Linear category filter shared by the in-memory store and storage backends.
pub fn filter_by_category<'a>(facts: &'a [Fact], category: &str) -> Vec<&'a Fact> {
    let category = category.trim().to_lowercase();
    facts
        .iter()
        .filter(|f| f.category.to_lowercase() == category)
        .collect()
}

/// Linear substring search. A blank query matches nothing.
pub fn search_facts<'a>(facts: &'a [Fact], query: &str) -> Vec<&'a Fact> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    facts
        .iter()
        .filter(|f| {
            f.title.to_lowercase().contains(&needle)
                || f.content.to_lowercase().contains(&needle)
                || f.category.to_lowercase().contains(&needle)
        })
        .collect()
}

// ─── JSON flattening ───────────────────────────────────────────────────────

/// Flatten an arbitrary JSON value into prompt-friendly text.
///
/// - strings, numbers and booleans render as themselves, `null` as nothing
/// - arrays of scalars become one comma-separated line
/// - objects become `key: value` lines; nested keys are joined with a space
///   and underscores in keys become spaces
pub fn flatten_json(value: &Value) -> String {
    let mut lines = Vec::new();
    flatten_into(value, "", &mut lines);
    lines.join("\n")
}

fn flatten_into(value: &Value, prefix: &str, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.replace('_', " ");
                let key = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix} {key}")
                };
                flatten_into(child, &key, lines);
            }
        }
        Value::Array(items) if items.iter().all(is_scalar) => {
            let joined = items
                .iter()
                .map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            push_line(lines, prefix, joined);
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(item, prefix, lines);
            }
        }
        scalar => push_line(lines, prefix, scalar_text(scalar)),
    }
}

fn push_line(lines: &mut Vec<String>, prefix: &str, text: String) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if prefix.is_empty() {
        lines.push(text.to_string());
    } else {
        lines.push(format!("{prefix}: {text}"));
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FactStore {
        FactStore::from_json(
            r#"[
                {"category": "Fees", "title": "B.Tech", "content": "₹95,000 per year"},
                {"category": "courses", "title": "MBA", "content": {"duration": "2 years", "seats": 120}},
                {"category": "fees", "title": "Hostel", "content": "₹60,000 including mess"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn bundled_facts_load() {
        let store = FactStore::bundled().unwrap();
        assert!(store.len() >= 10);
        assert!(store.categories().contains(&"admission"));
        assert!(store.categories().contains(&"contact"));
        assert_eq!(store.all()[0].id, 1);
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let store = sample();
        let ids: Vec<i64> = store.all().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn categories_are_normalized_to_lowercase() {
        let store = sample();
        assert_eq!(store.categories(), vec!["fees", "courses"]);
    }

    #[test]
    fn by_category_ignores_case() {
        let store = sample();
        let fees = store.by_category("FEES");
        assert_eq!(fees.len(), 2);
        assert_eq!(fees[0].title, "B.Tech");
        assert!(store.by_category("placement").is_empty());
    }

    #[test]
    fn search_matches_title_content_and_category() {
        let store = sample();
        assert_eq!(store.search("mba").len(), 1);
        assert_eq!(store.search("MESS").len(), 1);
        assert_eq!(store.search("course").len(), 1);
        assert_eq!(store.search("₹").len(), 2);
    }

    #[test]
    fn blank_search_matches_nothing() {
        assert!(sample().search("   ").is_empty());
    }

    #[test]
    fn push_appends_with_next_id() {
        let mut store = sample();
        let fact = store.push(NewFact::new("contact", "Phone", "+91 141 555 0142"));
        assert_eq!(fact.id, 4);
        assert_eq!(store.len(), 4);
        assert_eq!(store.all()[3].title, "Phone");
    }

    #[test]
    fn structured_content_is_flattened() {
        let store = sample();
        assert_eq!(store.all()[1].content, "duration: 2 years\nseats: 120");
    }

    #[test]
    fn rejects_blank_records() {
        let err = FactStore::from_json(r#"[{"category": "x", "title": "", "content": "y"}]"#)
            .unwrap_err();
        assert!(matches!(err, FactsError::Invalid { index: 0, .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            FactStore::from_json("{not json"),
            Err(FactsError::Json(_))
        ));
    }

    #[test]
    fn flatten_scalars() {
        assert_eq!(flatten_json(&json!("plain")), "plain");
        assert_eq!(flatten_json(&json!(42)), "42");
        assert_eq!(flatten_json(&json!(true)), "true");
        assert_eq!(flatten_json(&json!(null)), "");
    }

    #[test]
    fn flatten_nested_objects_and_arrays() {
        let value = json!({
            "office_hours": "9:30 AM to 5 PM",
            "hostel": {"boys": "400 beds", "girls": null},
            "recruiters": ["TCS", "Infosys"],
            "branches": [{"name": "CSE"}, {"name": "ECE"}]
        });
        assert_eq!(
            flatten_json(&value),
            "office hours: 9:30 AM to 5 PM\n\
             hostel boys: 400 beds\n\
             recruiters: TCS, Infosys\n\
             branches name: CSE\n\
             branches name: ECE"
        );
    }

    #[test]
    fn flatten_top_level_list() {
        assert_eq!(flatten_json(&json!(["a", "", "b"])), "a, b");
    }
}
