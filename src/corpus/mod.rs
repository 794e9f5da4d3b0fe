//! Canonical text data layer.
//!
//! * [`normalize`]: diacritic stripping and whitespace collapsing.
//! * [`CorpusStore`]: immutable `(chapter_id, verse_id)` index over the
//!   bulk XML resource.
//! * [`SharedCorpus`]: once-only lazy load of the store.
//! * [`CorpusError`]: why the corpus could not be made available.

pub mod normalize;
pub mod source;
pub mod store;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use normalize::{normalize, words};
pub use source::{ensure_corpus_file, load_corpus, SharedCorpus};
pub use store::{Chapter, ChapterSummary, CorpusStore, Verse, CHAPTER_COUNT};

// ---------------------------------------------------------------------------
// CorpusError
// ---------------------------------------------------------------------------

/// The corpus is unavailable.  Every variant is fatal at startup: no matching
/// can happen without the canonical text.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The bulk resource could not be downloaded.
    #[error("corpus download failed: {0}")]
    Fetch(String),

    /// Reading or writing the local copy failed.
    #[error("corpus file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The resource is not a well-formed chapter/verse document.
    #[error("corpus is malformed: {0}")]
    Parse(String),

    /// The document parsed but contains no chapters.
    #[error("corpus contains no chapters")]
    Empty,
}
