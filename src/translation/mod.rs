//! Human-readable translations, fetched lazily per chapter.
//!
//! * [`TranslationProvider`]: async trait implemented by remote sources.
//! * [`QuranEncProvider`]: QuranEnc JSON API implementation.
//! * [`TranslationCache`]: per-language, per-chapter single-flight cache.
//! * [`clean_translation`]: strips verse-number prefixes and footnotes.
//! * [`TranslationError`]: error variants for provider calls.

pub mod cache;
pub mod clean;
pub mod provider;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cache::TranslationCache;
pub use clean::clean_translation;
pub use provider::{parse_chapter, QuranEncProvider, TranslationEntry, TranslationProvider};

// ---------------------------------------------------------------------------
// TranslationError
// ---------------------------------------------------------------------------

/// Errors from a single chapter fetch.  The cache absorbs them: callers of
/// [`TranslationCache::get`] only ever see an empty string.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The provider answered with a non-success status code.
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON.
    #[error("failed to parse translation response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslationError::Timeout
        } else {
            TranslationError::Request(e.to_string())
        }
    }
}
