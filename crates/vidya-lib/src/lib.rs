//! vidya-lib: server engine for the college information widget.
//!
//! Storage backends, the Groq chat-completion client, the chat service with
//! canned-reply fallback, the Cartesia → ElevenLabs → browser TTS chain, and
//! the HTTP API. Depends on vidya-core for pure types and text processing.

pub mod chat;
pub mod config;
pub mod llm;
pub mod server;
pub mod storage;
pub mod tts;

// Re-export vidya-core for convenience
pub use vidya_core;
