//! Hindi / English detection by lexical heuristic.
//!
//! Two signals, checked in order:
//!
//! 1. Devanagari script share of the letters in the text.
//! 2. Romanized Hindi marker words ("kya", "hai", "kitni", ...) among the
//!    ASCII words.
//!
//! Anything else, including empty input, is English.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language of a message or of text to be spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "hi")]
    Hindi,
    #[default]
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// ISO 639-1 code, as sent to the TTS providers.
    pub fn code(self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::English => "en",
        }
    }

    pub fn is_hindi(self) -> bool {
        self == Self::Hindi
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hi" | "hindi" => Ok(Self::Hindi),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unknown language '{other}'; expected 'hi' or 'en'")),
        }
    }
}

/// Minimum share of Devanagari letters, in percent, for a text to count as Hindi.
const DEVANAGARI_MIN_PERCENT: usize = 10;

/// Romanized Hindi words that rarely occur in English questions.
const HINDI_MARKERS: &[&str] = &[
    "aap", "aapka", "aapke", "aur", "batao", "bataiye", "bataye", "bhi", "chahiye", "hai",
    "hain", "hoga", "hogi", "hota", "hoti", "kab", "kahan", "kaise", "kaisa", "kaun", "karna",
    "karne", "kitna", "kitne", "kitni", "kripya", "kya", "kyun", "liye", "mein", "milega",
    "milegi", "mujhe", "nahi", "nahin", "padhai", "sakta", "sakte", "wahan", "yahan",
];

/// Detect whether `text` is Hindi (Devanagari or romanized) or English.
pub fn detect_language(text: &str) -> Language {
    let mut letters = 0usize;
    let mut devanagari = 0usize;
    for c in text.chars() {
        if c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit() {
            continue;
        }
        letters += 1;
        if is_devanagari(c) {
            devanagari += 1;
        }
    }

    if letters == 0 {
        return Language::English;
    }
    if devanagari > 0 && devanagari * 100 >= letters * DEVANAGARI_MIN_PERCENT {
        return Language::Hindi;
    }

    let words: Vec<String> = text
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    let markers = words
        .iter()
        .filter(|w| HINDI_MARKERS.contains(&w.as_str()))
        .count();

    if markers >= 2 || (markers >= 1 && markers * 4 >= words.len()) {
        Language::Hindi
    } else {
        Language::English
    }
}

/// Devanagari block plus Devanagari Extended.
pub fn is_devanagari(c: char) -> bool {
    matches!(c as u32, 0x0900..=0x097F | 0xA8E0..=0xA8FF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devanagari_is_hindi() {
        assert_eq!(detect_language("प्रवेश प्रक्रिया क्या है?"), Language::Hindi);
    }

    #[test]
    fn mixed_script_with_enough_devanagari_is_hindi() {
        assert_eq!(detect_language("B.Tech की फीस कितनी है"), Language::Hindi);
    }

    #[test]
    fn stray_devanagari_word_in_long_english_stays_english() {
        let text = "Please tell me about the computer science engineering program and its \
                    laboratories, faculty, research output and placement record नमस्ते";
        assert_eq!(detect_language(text), Language::English);
    }

    #[test]
    fn romanized_hindi_is_hindi() {
        assert_eq!(detect_language("admission kaise hota hai"), Language::Hindi);
        assert_eq!(detect_language("fees kitni hai?"), Language::Hindi);
    }

    #[test]
    fn single_marker_in_short_text_is_hindi() {
        assert_eq!(detect_language("kya?"), Language::Hindi);
    }

    #[test]
    fn single_marker_in_long_english_stays_english() {
        assert_eq!(
            detect_language("What courses are offered in the engineering department for aur students"),
            Language::English
        );
    }

    #[test]
    fn english_is_english() {
        assert_eq!(detect_language("What is the fee for B.Tech?"), Language::English);
    }

    #[test]
    fn empty_and_punctuation_are_english() {
        assert_eq!(detect_language(""), Language::English);
        assert_eq!(detect_language("  ?! 123 "), Language::English);
    }

    #[test]
    fn codes_and_parsing() {
        assert_eq!(Language::Hindi.code(), "hi");
        assert_eq!(Language::English.to_string(), "en");
        assert_eq!("HI".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Language::Hindi).unwrap(), "\"hi\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::English);
    }
}
