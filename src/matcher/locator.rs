//! Approximate search of a transcript over the whole corpus.
//!
//! Every chapter is scanned in ascending order.  From each start verse the
//! locator tries windows of 1 to `max_window` consecutive verses, scores the
//! window's normalised text against the normalised transcript with a
//! character-level block-matching ratio, and keeps the best.  A window that
//! beats `early_exit_threshold` ends the search immediately.

use std::sync::Arc;

use super::diff::BlockMatcher;
use super::types::{VerseMatch, VerseSpan};
use crate::config::MatcherConfig;
use crate::corpus::{normalize, CorpusStore};

/// How much of the corpus a single [`VerseLocator::locate_with_stats`] call
/// looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub chapters_visited: usize,
    pub windows_scored: usize,
    pub early_exit: bool,
}

/// Finds the verse span a transcript most likely recites.
#[derive(Debug, Clone)]
pub struct VerseLocator {
    corpus: Arc<CorpusStore>,
    max_window: usize,
    early_exit_threshold: f64,
}

impl VerseLocator {
    pub fn new(corpus: Arc<CorpusStore>, config: &MatcherConfig) -> Self {
        Self {
            corpus,
            max_window: config.max_window.max(1),
            early_exit_threshold: config.early_exit_threshold,
        }
    }

    /// Best-matching span, or [`VerseMatch::none`] for a blank transcript or
    /// when nothing scores above zero.
    pub fn locate(&self, transcript: &str) -> VerseMatch {
        self.locate_with_stats(transcript).0
    }

    pub fn locate_with_stats(&self, transcript: &str) -> (VerseMatch, ScanStats) {
        let mut stats = ScanStats::default();

        let norm_transcript = normalize(transcript);
        if norm_transcript.is_empty() {
            return (VerseMatch::none(), stats);
        }
        let matcher = BlockMatcher::new(norm_transcript.chars().collect());

        let mut best = VerseMatch::none();
        let mut window_chars: Vec<char> = Vec::new();

        for chapter in self.corpus.chapters() {
            stats.chapters_visited += 1;

            let mut start: u16 = 1;
            while chapter.verses.get(&start).is_some_and(|v| !v.is_blank()) {
                window_chars.clear();

                for offset in 0..self.max_window {
                    let Some(end) = start.checked_add(offset as u16) else {
                        break;
                    };
                    let Some(verse) = chapter.verses.get(&end).filter(|v| !v.is_blank()) else {
                        break;
                    };

                    if !verse.normalized.is_empty() {
                        if !window_chars.is_empty() {
                            window_chars.push(' ');
                        }
                        window_chars.extend(verse.normalized.chars());
                    }
                    if window_chars.is_empty() {
                        continue;
                    }

                    stats.windows_scored += 1;
                    let ratio = matcher.ratio(&window_chars);
                    if ratio > best.score {
                        best = VerseMatch {
                            span: Some(VerseSpan {
                                chapter_id: chapter.id,
                                verse_id_start: start,
                                verse_id_end: end,
                            }),
                            score: ratio,
                        };
                        if ratio > self.early_exit_threshold {
                            log::debug!(
                                "Early exit at chapter {} verses {start}-{end} (ratio {ratio:.3})",
                                chapter.id
                            );
                            stats.early_exit = true;
                            return (best, stats);
                        }
                    }
                }

                match start.checked_add(1) {
                    Some(next) => start = next,
                    None => break,
                }
            }
        }

        (best, stats)
    }
}
