//! ElevenLabs TTS provider (tier 2).
//!
//! Flash v2.5 gives the lowest latency for English. Hindi goes through the
//! multilingual model, which handles Devanagari properly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use tracing::debug;

use vidya_core::language::Language;
use vidya_core::text_prep::PreparedSpeech;

use super::{Audio, SpeechProvider, TtsError};
use crate::config::ElevenLabsConfig;

const PROVIDER: &str = "elevenlabs";

const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// ElevenLabs TTS provider.
#[derive(Clone)]
pub struct ElevenLabsTts {
    client: Client,
    api_key: Option<Secret<String>>,
    base_url: String,
    voice_id: String,
    model: String,
    hindi_model: String,
    timeout: Duration,
}

impl std::fmt::Debug for ElevenLabsTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTts")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("voice_id", &self.voice_id)
            .field("model", &self.model)
            .field("hindi_model", &self.hindi_model)
            .finish()
    }
}

impl ElevenLabsTts {
    pub fn new(config: &ElevenLabsConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            voice_id: config.voice_id.clone(),
            model: config.model.clone(),
            hindi_model: config.hindi_model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn model_for(&self, language: Language) -> &str {
        match language {
            Language::Hindi => &self.hindi_model,
            Language::English => &self.model,
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsTts {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, speech: &PreparedSpeech) -> Result<Audio, TtsError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(TtsError::NotConfigured(PROVIDER))?;
        let model = self.model_for(speech.language);

        let body = TtsRequest {
            text: &speech.text,
            model_id: model,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let url = format!(
            "{}/text-to-speech/{}?output_format={OUTPUT_FORMAT}",
            self.base_url, self.voice_id
        );
        debug!(
            "elevenlabs: POST {} chars, model {model}",
            speech.text.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key.expose_secret())
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
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}
