//! Canned replies used when the chat-completion call fails.
//!
//! Topics are checked in table order; the first one with a matching keyword
//! wins. ASCII keywords match whole words, or word prefixes for keywords of
//! four letters or more ("placement" covers "placements"). Devanagari and
//! multi-word keywords match as substrings.

use crate::language::{Language, detect_language};

struct Topic {
    name: &'static str,
    keywords: &'static [&'static str],
    english: &'static str,
    hindi: &'static str,
}

const TOPICS: &[Topic] = &[
    Topic {
        name: "admission",
        keywords: &[
            "admission", "admissions", "apply", "application", "eligibility", "entrance",
            "counselling", "dakhila", "pravesh", "प्रवेश", "दाखिला", "एडमिशन", "आवेदन",
        ],
        english: "Admission to B.Tech is through JEE Main and state counselling, and the application window is usually June 1 to July 15. For MBA and MCA, admission is through the state entrance test followed by an interview. Please contact the admissions office for the exact dates.",
        hindi: "बी टेक में प्रवेश जेईई मेन और राज्य काउंसलिंग के माध्यम से होता है, और आवेदन आमतौर पर 1 जून से 15 जुलाई तक होते हैं। एमबीए और एमसीए में प्रवेश राज्य प्रवेश परीक्षा और साक्षात्कार से होता है। सही तारीखों के लिए कृपया प्रवेश कार्यालय से संपर्क करें।",
    },
    Topic {
        name: "fees",
        keywords: &[
            "fee", "fees", "cost", "tuition", "scholarship", "scholarships", "paisa", "kharcha",
            "फीस", "शुल्क", "खर्च", "छात्रवृत्ति",
        ],
        english: "The B.Tech tuition fee is about 95,000 rupees per year, and scholarships are available for merit students and eligible categories. For the complete fee structure, please contact the accounts or admissions office.",
        hindi: "बी टेक की ट्यूशन फीस लगभग 95,000 रुपये प्रति वर्ष है, और मेधावी तथा पात्र छात्रों के लिए छात्रवृत्ति उपलब्ध है। पूरी फीस संरचना के लिए कृपया प्रवेश कार्यालय से संपर्क करें।",
    },
    Topic {
        name: "courses",
        keywords: &[
            "course", "courses", "program", "programme", "branch", "branches", "btech", "b.tech",
            "mba", "mca", "bca", "bba", "degree", "कोर्स", "पाठ्यक्रम", "ब्रांच",
        ],
        english: "We offer B.Tech in Computer Science, Electronics, Mechanical, Civil and Electrical Engineering, along with BCA, BBA, MBA, MCA and M.Tech programmes.",
        hindi: "हम कंप्यूटर साइंस, इलेक्ट्रॉनिक्स, मैकेनिकल, सिविल और इलेक्ट्रिकल इंजीनियरिंग में बी टेक के साथ बीसीए, बीबीए, एमबीए, एमसीए और एम टेक कोर्स प्रदान करते हैं।",
    },
    Topic {
        name: "placement",
        keywords: &[
            "placement", "placements", "job", "jobs", "package", "recruiter", "recruiters",
            "naukri", "प्लेसमेंट", "नौकरी", "पैकेज",
        ],
        english: "Our training and placement cell works with recruiters such as TCS, Infosys, Wipro and L and T. Please contact the placement cell for the latest placement record.",
        hindi: "हमारा ट्रेनिंग और प्लेसमेंट सेल टीसीएस, इंफोसिस, विप्रो और एल एंड टी जैसी कंपनियों के साथ काम करता है। नवीनतम प्लेसमेंट जानकारी के लिए कृपया प्लेसमेंट सेल से संपर्क करें।",
    },
    Topic {
        name: "hostel",
        keywords: &[
            "hostel", "hostels", "accommodation", "mess", "bus", "transport", "हॉस्टल",
            "छात्रावास", "बस",
        ],
        english: "Separate hostels are available for boys and girls with mess facilities, and college buses run on routes across the city.",
        hindi: "लड़कों और लड़कियों के लिए अलग हॉस्टल मेस सुविधा के साथ उपलब्ध हैं, और कॉलेज की बसें शहर के कई रूटों पर चलती हैं।",
    },
    Topic {
        name: "contact",
        keywords: &[
            "contact", "phone", "email", "address", "location", "office", "number", "sampark",
            "संपर्क", "फोन", "पता", "ईमेल",
        ],
        english: "You can reach the admissions office at plus 91 141 555 0142 or admissions at sarvodaya-cet dot edu dot in, Monday to Saturday from 9:30 AM to 5 PM.",
        hindi: "आप प्रवेश कार्यालय से +91 141 555 0142 पर या admissions@sarvodaya-cet.edu.in पर सोमवार से शनिवार सुबह 9:30 से शाम 5 बजे तक संपर्क कर सकते हैं।",
    },
    Topic {
        name: "greeting",
        keywords: &[
            "hello", "hi", "hey", "namaste", "namaskar", "good morning", "नमस्ते", "नमस्कार",
        ],
        english: "Hello! I can help you with admissions, courses, fees, hostels, placements and contact details. What would you like to know?",
        hindi: "नमस्ते! मैं प्रवेश, कोर्स, फीस, हॉस्टल, प्लेसमेंट और संपर्क की जानकारी में आपकी मदद कर सकता हूँ। आप क्या जानना चाहेंगे?",
    },
];

const NO_MATCH_ENGLISH: &str = "Sorry, I am unable to answer that right now. Please contact the admissions office at plus 91 141 555 0142 for help.";
const NO_MATCH_HINDI: &str = "क्षमा करें, मैं अभी इसका उत्तर नहीं दे पा रहा हूँ। कृपया सहायता के लिए प्रवेश कार्यालय से +91 141 555 0142 पर संपर्क करें।";

/// A canned reply, with the topic it matched (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackReply {
    pub text: &'static str,
    pub language: Language,
    pub topic: Option<&'static str>,
}

/// Pick the canned reply for `message`, in the message's language.
pub fn fallback_reply(message: &str) -> FallbackReply {
    let language = detect_language(message);
    let lowered = message.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '.'))
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty())
        .collect();

    let topic = TOPICS
        .iter()
        .find(|t| t.keywords.iter().any(|kw| keyword_matches(kw, &lowered, &words)));

    match (topic, language) {
        (Some(t), Language::Hindi) => FallbackReply {
            text: t.hindi,
            language,
            topic: Some(t.name),
        },
        (Some(t), Language::English) => FallbackReply {
            text: t.english,
            language,
            topic: Some(t.name),
        },
        (None, Language::Hindi) => FallbackReply {
            text: NO_MATCH_HINDI,
            language,
            topic: None,
        },
        (None, Language::English) => FallbackReply {
            text: NO_MATCH_ENGLISH,
            language,
            topic: None,
        },
    }
}

fn keyword_matches(keyword: &str, lowered: &str, words: &[&str]) -> bool {
    if !keyword.is_ascii() || keyword.contains(' ') {
        return lowered.contains(keyword);
    }
    words
        .iter()
        .any(|w| *w == keyword || (keyword.len() >= 4 && w.starts_with(keyword)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_topics() {
        let reply = fallback_reply("How do I apply for admission?");
        assert_eq!(reply.topic, Some("admission"));
        assert_eq!(reply.language, Language::English);
        assert!(reply.text.contains("JEE Main"));

        assert_eq!(fallback_reply("What are the fees?").topic, Some("fees"));
        assert_eq!(fallback_reply("Which B.Tech branches exist").topic, Some("courses"));
        assert_eq!(fallback_reply("average package?").topic, Some("placement"));
        assert_eq!(fallback_reply("Is there a hostel").topic, Some("hostel"));
        assert_eq!(fallback_reply("phone number please").topic, Some("contact"));
    }

    #[test]
    fn hindi_reply_for_devanagari_question() {
        let reply = fallback_reply("फीस कितनी है?");
        assert_eq!(reply.topic, Some("fees"));
        assert_eq!(reply.language, Language::Hindi);
        assert!(reply.text.contains("रुपये"));
    }

    #[test]
    fn hindi_reply_for_romanized_question() {
        let reply = fallback_reply("admission kaise hota hai");
        assert_eq!(reply.topic, Some("admission"));
        assert_eq!(reply.language, Language::Hindi);
    }

    #[test]
    fn earlier_topic_wins() {
        // greeting comes last, so the actual question is answered
        assert_eq!(fallback_reply("hello, what is the fee").topic, Some("fees"));
    }

    #[test]
    fn short_keywords_match_whole_words_only() {
        // "hi" must not fire inside "this" or "which"
        let reply = fallback_reply("this is something else entirely");
        assert_eq!(reply.topic, None);
        assert_eq!(fallback_reply("hi").topic, Some("greeting"));
    }

    #[test]
    fn long_keywords_match_prefixes() {
        assert_eq!(fallback_reply("placements last year").topic, Some("placement"));
        assert_eq!(fallback_reply("courseware").topic, Some("courses"));
    }

    #[test]
    fn no_match_is_an_apology() {
        let reply = fallback_reply("what is the meaning of life");
        assert_eq!(reply.topic, None);
        assert!(reply.text.starts_with("Sorry"));

        let reply = fallback_reply("मौसम कैसा है");
        assert_eq!(reply.topic, None);
        assert_eq!(reply.language, Language::Hindi);
        assert!(reply.text.starts_with("क्षमा"));
    }
}
