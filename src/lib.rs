//! Recitation verse matching.
//!
//! Given a noisy transcript of recited Quran text, find the verse span it
//! corresponds to, classify every word as correct, missed or extra, and
//! reduce that to an accuracy percentage.
//!
//! ```text
//! transcript ─▶ VerseLocator ─▶ span ─▶ align_words ─▶ accuracy
//!                   │                        │
//!              CorpusStore ◀── normalize ────┘
//!
//! TranslationCache ─▶ TranslationProvider (QuranEnc, per chapter)
//! ```
//!
//! [`RecitationEngine`] is the entry point; it is built once from a loaded
//! corpus and shared by every caller.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod matcher;
pub mod translation;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::{RecitationEngine, SOURCE_LANGUAGE};
pub use matcher::{AlignmentToken, MatchResult, WordStatus};
