//! Text preparation for speech: markdown cleaning, transliteration of
//! tokens TTS voices mispronounce, and length capping.
//!
//! Pure functions, no I/O.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::language::{Language, detect_language};

// Compiled regexes, allocated once.
static RE_FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static RE_INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_HR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\s]*[-*_]{3,}[\s]*$").unwrap());
static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#{1,6}\s*").unwrap());
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)\S+").unwrap());
static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\s]*[-*•]\s+").unwrap());
static RE_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\s]*\d+[.)]\s+").unwrap());
static RE_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Extended_Pictographic}\x{FE0F}\x{200D}]").unwrap());
static RE_LEADING_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\s*").unwrap());
static RE_DOUBLE_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s*\.").unwrap());
static RE_MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

// Transliteration patterns.
static RE_DEGREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([BM])\.\s?(Tech|Sc|Com|Ed|Pharm|Arch|A)\b\.?").unwrap()
});
static RE_PHD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPh\.?\s?D\b\.?").unwrap());
static RE_ACRONYM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(MBA|BBA|BCA|MCA|AICTE|NAAC|UGC|NIRF|JEE|CSE|ECE|LPA)\b").unwrap()
});
static RE_DIGIT_GROUPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d),(\d{2,3})\b").unwrap());
static RE_RUPEES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|\bRs\.?|\bINR)\s*(\d+(?:\.\d+)?)").unwrap()
});
static RE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*%").unwrap());
static RE_AMPERSAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*&\s*").unwrap());

/// Default cap on the length of text sent to a TTS provider.
pub const DEFAULT_MAX_SPEECH_CHARS: usize = 2000;

/// Text ready to hand to a TTS provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSpeech {
    pub text: String,
    pub language: Language,
}

/// Strip markdown, URLs and emoji so text reads naturally when spoken.
///
/// Handles: fenced code blocks, inline code, bold/italic, headings, links,
/// bare URLs, bullets/numbered lists, horizontal rules, pictographs.
pub fn clean_text_for_speech(text: &str) -> String {
    let mut c = text.to_string();

    // Fenced code blocks → dropped, nobody wants them read aloud
    c = RE_FENCED_CODE.replace_all(&c, " ").into_owned();
    // Inline code → contents
    c = RE_INLINE_CODE.replace_all(&c, "$1").into_owned();
    // Horizontal rules → removed
    c = RE_HR.replace_all(&c, "").into_owned();
    // Bold → plain
    c = RE_BOLD.replace_all(&c, "$1").into_owned();
    // Italic → plain
    c = RE_ITALIC.replace_all(&c, "$1").into_owned();
    // Headings → pound signs removed
    c = RE_HEADING.replace_all(&c, "").into_owned();
    // Links → text only; bare URLs → removed
    c = RE_LINK.replace_all(&c, "$1").into_owned();
    c = RE_URL.replace_all(&c, "").into_owned();
    // Bullets / numbered lists → ". " prefix
    c = RE_BULLET.replace_all(&c, ". ").into_owned();
    c = RE_NUMBERED.replace_all(&c, ". ").into_owned();
    // Emoji → removed
    c = RE_EMOJI.replace_all(&c, "").into_owned();
    // Clean up leading dot at start of string
    c = RE_LEADING_DOT.replace(&c, "").into_owned();
    // Double periods → single
    c = RE_DOUBLE_DOT.replace_all(&c, ".").into_owned();
    // Collapse whitespace
    c = RE_MULTI_SPACE.replace_all(&c, " ").into_owned();

    c.trim().to_string()
}

/// Rewrite abbreviations, currency, percentages and symbols into words the
/// voice will pronounce correctly in `language`.
pub fn transliterate_for_speech(text: &str, language: Language) -> String {
    let (and, percent, rupees) = match language {
        Language::Hindi => ("और", "प्रतिशत", "रुपये"),
        Language::English => ("and", "percent", "rupees"),
    };

    let mut c = text.to_string();

    // B.Tech → B Tech, M.Sc. → M Sc
    c = RE_DEGREE.replace_all(&c, "$1 $2").into_owned();
    c = RE_PHD.replace_all(&c, "P H D").into_owned();
    // MBA → M B A
    c = RE_ACRONYM
        .replace_all(&c, |caps: &Captures| spell_out(&caps[1]))
        .into_owned();
    // 1,10,000 → 110000 (Indian and Western grouping alike); "1,2" stays a list
    while RE_DIGIT_GROUPING.is_match(&c) {
        c = RE_DIGIT_GROUPING.replace_all(&c, "$1$2").into_owned();
    }
    // ₹95000 → 95000 rupees
    c = RE_RUPEES
        .replace_all(&c, |caps: &Captures| format!("{} {rupees}", &caps[1]))
        .into_owned();
    // 45% → 45 percent
    c = RE_PERCENT
        .replace_all(&c, |caps: &Captures| format!("{} {percent}", &caps[1]))
        .into_owned();
    // & → and
    c = RE_AMPERSAND.replace_all(&c, format!(" {and} ")).into_owned();

    c = RE_MULTI_SPACE.replace_all(&c, " ").into_owned();
    c.trim().to_string()
}

/// Clean, detect language, transliterate and cap the length.
pub fn prepare_for_speech(text: &str, max_chars: usize) -> PreparedSpeech {
    let cleaned = clean_text_for_speech(text);
    let language = detect_language(&cleaned);
    let text = transliterate_for_speech(&cleaned, language);
    PreparedSpeech {
        text: truncate_for_speech(&text, max_chars),
        language,
    }
}

/// Cap `text` at `max_chars` characters.
///
/// Prefers a sentence boundary (`. `, `? `, `! `, `। `) in the second half of
/// the window, then a word boundary in the last two thirds, then hard-splits.
pub fn truncate_for_speech(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let window = &text[..cut];

    let half = byte_offset(window, max_chars / 2);
    let sentence_end = window
        .char_indices()
        .filter(|&(i, c)| {
            matches!(c, '.' | '?' | '!' | '।')
                && i >= half
                && window[i + c.len_utf8()..].starts_with(' ')
        })
        .map(|(i, c)| i + c.len_utf8())
        .last();
    if let Some(end) = sentence_end {
        return window[..end].to_string();
    }

    let third = byte_offset(window, max_chars / 3);
    if let Some(pos) = window.rfind(' ') {
        if pos >= third {
            return window[..pos].trim_end().to_string();
        }
    }
    window.to_string()
}

/// Byte offset of the `n`th char of `s`, or `s.len()` past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

fn spell_out(acronym: &str) -> String {
    acronym
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── clean_text_for_speech ───────────────────────────────────────

    #[test]
    fn drops_fenced_code_blocks() {
        let input = "before ```rust\nfn main() {}\n``` after";
        assert_eq!(clean_text_for_speech(input), "before after");
    }

    #[test]
    fn keeps_inline_code_contents() {
        assert_eq!(clean_text_for_speech("type `help` here"), "type help here");
    }

    #[test]
    fn strips_bold_and_italic() {
        assert_eq!(
            clean_text_for_speech("this is **bold** and *italic* text"),
            "this is bold and italic text"
        );
    }

    #[test]
    fn strips_headings() {
        assert_eq!(clean_text_for_speech("## Fees"), "Fees");
    }

    #[test]
    fn strips_links_and_urls() {
        assert_eq!(
            clean_text_for_speech("apply [online](https://example.com) or at https://x.in/apply today"),
            "apply online or at today"
        );
    }

    #[test]
    fn bullets_become_sentence_breaks() {
        let result = clean_text_for_speech("Courses:\n- B.Tech\n- MBA\n1) MCA");
        assert!(result.contains(". B.Tech"));
        assert!(result.contains(". MBA"));
        assert!(result.contains(". MCA"));
    }

    #[test]
    fn strips_horizontal_rules() {
        let result = clean_text_for_speech("above\n---\nbelow");
        assert!(!result.contains("---"));
        assert!(result.contains("above"));
        assert!(result.contains("below"));
    }

    #[test]
    fn strips_emoji() {
        assert_eq!(clean_text_for_speech("Welcome! 🎓✨ See you"), "Welcome! See you");
        assert_eq!(clean_text_for_speech("नमस्ते 🙏"), "नमस्ते");
    }

    #[test]
    fn cleans_double_periods() {
        assert_eq!(clean_text_for_speech("end.. start"), "end. start");
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_text_for_speech(""), "");
    }

    #[test]
    fn devanagari_unchanged() {
        let text = "प्रवेश जून से शुरू होता है।";
        assert_eq!(clean_text_for_speech(text), text);
    }

    // ── transliterate_for_speech ────────────────────────────────────

    #[test]
    fn expands_degrees() {
        assert_eq!(
            transliterate_for_speech("B.Tech and M.Sc. and Ph.D", Language::English),
            "B Tech and M Sc and P H D"
        );
    }

    #[test]
    fn spells_out_acronyms() {
        assert_eq!(
            transliterate_for_speech("MBA via JEE, AICTE approved", Language::English),
            "M B A via J E E, A I C T E approved"
        );
    }

    #[test]
    fn rupees_and_grouping() {
        assert_eq!(
            transliterate_for_speech("Fee is ₹1,10,000 per year", Language::English),
            "Fee is 110000 rupees per year"
        );
        assert_eq!(
            transliterate_for_speech("Rs. 95,000", Language::English),
            "95000 rupees"
        );
        assert_eq!(
            transliterate_for_speech("फीस ₹95,000 है", Language::Hindi),
            "फीस 95000 रुपये है"
        );
        assert_eq!(
            transliterate_for_speech("Fee is 1,234,567", Language::English),
            "Fee is 1234567"
        );
    }

    #[test]
    fn short_comma_lists_are_not_merged() {
        assert_eq!(
            transliterate_for_speech("rooms 1,2 and 3", Language::English),
            "rooms 1,2 and 3"
        );
        assert_eq!(
            transliterate_for_speech("blocks 4,5,6 are new", Language::English),
            "blocks 4,5,6 are new"
        );
    }

    #[test]
    fn percent_and_ampersand() {
        assert_eq!(
            transliterate_for_speech("45% in Physics & Maths", Language::English),
            "45 percent in Physics and Maths"
        );
        assert_eq!(
            transliterate_for_speech("45% भौतिकी & गणित", Language::Hindi),
            "45 प्रतिशत भौतिकी और गणित"
        );
    }

    // ── truncate_for_speech ─────────────────────────────────────────

    #[test]
    fn short_text_untouched() {
        assert_eq!(truncate_for_speech("Hello world.", 200), "Hello world.");
    }

    #[test]
    fn truncates_at_sentence_boundary() {
        let text = "First sentence here. Second sentence here. Third sentence that is long.";
        assert_eq!(
            truncate_for_speech(text, 50),
            "First sentence here. Second sentence here."
        );
    }

    #[test]
    fn truncates_at_danda() {
        let text = "प्रवेश जून में शुरू होता है। फीस हर साल जमा करनी होती है। बाकी जानकारी कार्यालय से लें।";
        let result = truncate_for_speech(text, 60);
        assert_eq!(result, "प्रवेश जून में शुरू होता है। फीस हर साल जमा करनी होती है।");
    }

    #[test]
    fn truncates_at_word_boundary() {
        let text = "word ".repeat(50);
        let result = truncate_for_speech(text.trim(), 32);
        assert!(result.chars().count() <= 32);
        assert!(result.ends_with("word"));
    }

    #[test]
    fn hard_truncates_long_word() {
        let text = "a".repeat(300);
        assert_eq!(truncate_for_speech(&text, 100).len(), 100);
    }

    // ── prepare_for_speech ──────────────────────────────────────────

    #[test]
    fn prepare_detects_hindi() {
        let prepared = prepare_for_speech("**फीस** ₹95,000 प्रति वर्ष है 🙂", 2000);
        assert_eq!(prepared.language, Language::Hindi);
        assert_eq!(prepared.text, "फीस 95000 रुपये प्रति वर्ष है");
    }

    #[test]
    fn prepare_english() {
        let prepared = prepare_for_speech("## Fees\nB.Tech costs ₹95,000 per year.", 2000);
        assert_eq!(prepared.language, Language::English);
        assert_eq!(prepared.text, "Fees\nB Tech costs 95000 rupees per year.");
    }
}
