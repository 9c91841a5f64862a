//! Server configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! environment variables and CLI flags (applied by the binary). API keys are
//! kept as [`Secret`]s so they never show up in `Debug` output or logs.

use std::path::{Path, PathBuf};

use secrecy::Secret;
use serde::Deserialize;

use vidya_core::prompt::DEFAULT_HISTORY_TURNS;
use vidya_core::text_prep::DEFAULT_MAX_SPEECH_CHARS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Name used in the assistant's instructions.
    pub college_name: String,
    /// JSON file replacing the bundled college facts.
    pub facts_path: Option<PathBuf>,
    /// `sqlite:` URL; in-memory storage when unset.
    pub database_url: Option<String>,
    pub chat: ChatConfig,
    pub tts: TtsConfig,
    pub groq: GroqConfig,
    pub cartesia: CartesiaConfig,
    pub elevenlabs: ElevenLabsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            college_name: "Sarvodaya College of Engineering and Technology".into(),
            facts_path: None,
            database_url: None,
            chat: ChatConfig::default(),
            tts: TtsConfig::default(),
            groq: GroqConfig::default(),
            cartesia: CartesiaConfig::default(),
            elevenlabs: ElevenLabsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat endpoint limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Longest accepted user message, in characters.
    pub max_message_chars: usize,
    /// Prior messages of the session replayed to the model.
    pub history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 1000,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }
}

/// Speech endpoint limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Longer text is truncated at a sentence or word boundary.
    pub max_text_chars: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_SPEECH_CHARS,
        }
    }
}

/// Groq chat-completion settings (from GROQ_API_KEY env or config).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".into(),
            model: "llama-3.1-8b-instant".into(),
            temperature: 0.7,
            max_tokens: 512,
            timeout_secs: 30,
        }
    }
}

/// Cartesia TTS settings (tier 1).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CartesiaConfig {
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    /// `Cartesia-Version` header value.
    pub api_version: String,
    pub model: String,
    /// Voice used for English text.
    pub voice_id: Option<String>,
    /// Voice used for Hindi text; falls back to `voice_id`.
    pub hindi_voice_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CartesiaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.cartesia.ai".into(),
            api_version: "2024-06-10".into(),
            model: "sonic-2".into(),
            voice_id: None,
            hindi_voice_id: None,
            timeout_secs: 20,
        }
    }
}

/// ElevenLabs TTS settings (tier 2).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElevenLabsConfig {
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub voice_id: String,
    /// Model for English text (Flash v2.5 for lowest latency).
    pub model: String,
    /// Model for Hindi text.
    pub hindi_model: String,
    pub timeout_secs: u64,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.elevenlabs.io/v1".into(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".into(),
            model: "eleven_flash_v2_5".into(),
            hindi_model: "eleven_multilingual_v2".into(),
            timeout_secs: 20,
        }
    }
}
