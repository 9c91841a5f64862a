//! vidya-core: pure types and text processing.
//!
//! No async runtime, no I/O, no network. Everything here is deterministic
//! and unit-tested in place.

pub mod facts;
pub mod fallback;
pub mod language;
pub mod prompt;
pub mod text_prep;
pub mod types;
