//! Speech synthesis with ordered fallback across TTS providers.
//!
//! ```text
//! speak(text) → prepare_for_speech (clean, detect hi/en, transliterate, cap)
//!     → tier 1: Cartesia     ── ok → audio
//!     → tier 2: ElevenLabs   ── ok → audio
//!     → tier 3: browser      ── client speaks the returned text itself
//! ```
//!
//! Each tier is tried at most once per request, in order, with no retries
//! and no concurrency. Unconfigured tiers are skipped. A tier that answers
//! with an empty body counts as failed. Nothing outlives the request.

mod cartesia;
mod elevenlabs;

pub use cartesia::CartesiaTts;
pub use elevenlabs::ElevenLabsTts;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use vidya_core::language::Language;
use vidya_core::text_prep::{PreparedSpeech, prepare_for_speech};

use crate::config::ServerConfig;

/// Identifier reported when every server-side tier failed.
pub const BROWSER_TIER: &str = "browser";

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} TTS request failed: {status} - {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} returned empty audio")]
    EmptyAudio(&'static str),
}

impl TtsError {
    fn request(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Request { provider, source }
    }
}

/// The dispatcher could not even start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpeakError {
    #[error("nothing to speak after cleaning the text")]
    EmptyText,
}

/// Synthesized audio.
#[derive(Debug, Clone)]
pub struct Audio {
    pub data: Bytes,
    pub content_type: &'static str,
}

/// One server-side TTS provider.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider identifier (e.g. "cartesia").
    fn id(&self) -> &'static str;

    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Synthesize prepared text.
    async fn synthesize(&self, speech: &PreparedSpeech) -> Result<Audio, TtsError>;
}

/// A failed tier, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierAttempt {
    pub provider: &'static str,
    pub error: String,
}

/// Result of a dispatch.
#[derive(Debug, Clone)]
pub enum SpeechOutcome {
    /// A server tier produced audio.
    Audio {
        provider: &'static str,
        audio: Audio,
        language: Language,
    },
    /// Every server tier failed or was unconfigured; the client should use
    /// browser-native speech for `text`.
    BrowserFallback {
        text: String,
        language: Language,
        attempts: Vec<TierAttempt>,
    },
}

/// Walks the provider tiers in order and returns the first audio produced.
pub struct SpeechDispatcher {
    tiers: Vec<Arc<dyn SpeechProvider>>,
    max_text_chars: usize,
}

impl SpeechDispatcher {
    pub fn new(tiers: Vec<Arc<dyn SpeechProvider>>, max_text_chars: usize) -> Self {
        Self {
            tiers,
            max_text_chars,
        }
    }

    /// Cartesia, then ElevenLabs.
    pub fn from_config(config: &ServerConfig) -> Self {
        let cartesia: Arc<dyn SpeechProvider> = Arc::new(CartesiaTts::new(&config.cartesia));
        let elevenlabs: Arc<dyn SpeechProvider> = Arc::new(ElevenLabsTts::new(&config.elevenlabs));
        Self::new(vec![cartesia, elevenlabs], config.tts.max_text_chars)
    }

    /// Identifiers of configured tiers, in order, ending with the browser tier.
    pub fn available_tiers(&self) -> Vec<&'static str> {
        self.tiers
            .iter()
            .filter(|t| t.is_configured())
            .map(|t| t.id())
            .chain(std::iter::once(BROWSER_TIER))
            .collect()
    }

    /// Prepare `text` and try each tier once, in order.
    pub async fn speak(&self, text: &str) -> Result<SpeechOutcome, SpeakError> {
        let speech = prepare_for_speech(text, self.max_text_chars);
        if !speech.text.chars().any(char::is_alphanumeric) {
            return Err(SpeakError::EmptyText);
        }

        debug!(
            "tts: {} chars, language {}",
            speech.text.chars().count(),
            speech.language
        );

        let mut attempts = Vec::new();
        for tier in &self.tiers {
            if !tier.is_configured() {
                debug!("tts: skipping unconfigured tier {}", tier.id());
                continue;
            }

            match tier.synthesize(&speech).await {
                Ok(audio) if audio.data.is_empty() => {
                    let err = TtsError::EmptyAudio(tier.id());
                    warn!("tts: {err}");
                    attempts.push(TierAttempt {
                        provider: tier.id(),
                        error: err.to_string(),
                    });
                }
                Ok(audio) => {
                    info!(
                        "tts: {} produced {} bytes ({})",
                        tier.id(),
                        audio.data.len(),
                        speech.language
                    );
                    return Ok(SpeechOutcome::Audio {
                        provider: tier.id(),
                        audio,
                        language: speech.language,
                    });
                }
                Err(err) => {
                    warn!("tts: tier {} failed: {err}", tier.id());
                    attempts.push(TierAttempt {
                        provider: tier.id(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            "tts: all server tiers failed ({} attempted), falling back to browser",
            attempts.len()
        );
        Ok(SpeechOutcome::BrowserFallback {
            text: speech.text,
            language: speech.language,
            attempts,
        })
    }
}
