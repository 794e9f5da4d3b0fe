//! Recitation matching.
//!
//! * [`VerseLocator`]: finds the verse span a transcript recites.
//! * [`align_words`]: word-level Correct / Missed / Extra classification.
//! * [`accuracy`]: percentage of canonical words recited correctly.
//! * [`BlockMatcher`]: the Ratcliff/Obershelp engine behind both.
//! * [`render_alignment_html`]: coloured markup for display.

pub mod align;
pub mod diff;
pub mod locator;
pub mod render;
pub mod score;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use align::align_words;
pub use diff::{char_ratio, Block, BlockMatcher, Opcode, Tag};
pub use locator::{ScanStats, VerseLocator};
pub use render::render_alignment_html;
pub use score::accuracy;
pub use types::{AlignmentToken, MatchResult, VerseMatch, VerseSpan, WordStatus};
