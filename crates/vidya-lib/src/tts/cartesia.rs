//! Cartesia TTS provider (tier 1).
//!
//! Uses the one-shot `/tts/bytes` endpoint, which returns a complete MP3
//! body. The Sonic models speak both Hindi and English; the language code
//! is passed explicitly so Hindi text is not read with an English accent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use tracing::debug;

use vidya_core::language::Language;
use vidya_core::text_prep::PreparedSpeech;

use super::{Audio, SpeechProvider, TtsError};
use crate::config::CartesiaConfig;

const PROVIDER: &str = "cartesia";

/// Cartesia TTS provider.
#[derive(Clone)]
pub struct CartesiaTts {
    client: Client,
    api_key: Option<Secret<String>>,
    base_url: String,
    api_version: String,
    model: String,
    voice_id: Option<String>,
    hindi_voice_id: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for CartesiaTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartesiaTts")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice_id", &self.voice_id)
            .field("hindi_voice_id", &self.hindi_voice_id)
            .finish()
    }
}

impl CartesiaTts {
    pub fn new(config: &CartesiaConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            voice_id: config.voice_id.clone(),
            hindi_voice_id: config.hindi_voice_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Voice for `language`; Hindi falls back to the default voice.
    fn voice_for(&self, language: Language) -> Option<&str> {
        match language {
            Language::Hindi => self.hindi_voice_id.as_deref().or(self.voice_id.as_deref()),
            Language::English => self.voice_id.as_deref(),
        }
    }
}

#[async_trait]
impl SpeechProvider for CartesiaTts {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.voice_id.is_some()
    }

    async fn synthesize(&self, speech: &PreparedSpeech) -> Result<Audio, TtsError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(TtsError::NotConfigured(PROVIDER))?;
        let voice_id = self
            .voice_for(speech.language)
            .ok_or(TtsError::NotConfigured(PROVIDER))?;

        let body = TtsRequest {
            model_id: &self.model,
            transcript: &speech.text,
            voice: VoiceSpec {
                mode: "id",
                id: voice_id,
            },
            output_format: OutputFormat {
                container: "mp3",
                sample_rate: 44_100,
                bit_rate: 128_000,
            },
            language: speech.language.code(),
        };

        debug!(
            "cartesia: POST {} chars, voice {voice_id}, language {}",
            speech.text.chars().count(),
            speech.language
        );

        let response = self
            .client
            .post(format!("{}/tts/bytes", self.base_url))
            .header("X-API-Key", api_key.expose_secret())
            .header("Cartesia-Version", &self.api_version)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(TtsError::request(PROVIDER))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let data = response.bytes().await.map_err(TtsError::request(PROVIDER))?;
        Ok(Audio {
            data,
            content_type: "audio/mpeg",
        })
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model_id: &'a str,
    transcript: &'a str,
    voice: VoiceSpec<'a>,
    output_format: OutputFormat,
    language: &'static str,
}

#[derive(Debug, Serialize)]
struct VoiceSpec<'a> {
    mode: &'static str,
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct OutputFormat {
    container: &'static str,
    sample_rate: u32,
    bit_rate: u32,
}
