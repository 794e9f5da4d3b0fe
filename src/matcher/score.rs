//! Single-number accuracy of an alignment.

use super::types::{AlignmentToken, WordStatus};

/// `100 * correct / canonical_word_count`, rounded to one decimal place.
/// Zero canonical words score `0.0`.
///
/// Rounding is half-to-even on the exact binary value, so `1.25` becomes
/// `1.2`.
pub fn accuracy(alignment: &[AlignmentToken], canonical_word_count: usize) -> f64 {
    if canonical_word_count == 0 {
        return 0.0;
    }
    let correct = alignment
        .iter()
        .filter(|t| t.status == WordStatus::Correct)
        .count();
    let pct = 100.0 * correct as f64 / canonical_word_count as f64;
    format!("{pct:.1}").parse().unwrap_or(0.0)
}
