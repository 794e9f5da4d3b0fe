//! Text canonicalisation used on both sides of every comparison.
//!
//! Diacritics (tashkeel) are removed by decomposing to base characters,
//! dropping combining marks and recomposing, so marked and unmarked Arabic
//! compare equal.  Whitespace runs collapse to one space and the ends are
//! trimmed.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalise `text` for comparison.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`, and the
/// empty string maps to the empty string.
///
/// ```
/// use iqra::corpus::normalize;
///
/// assert_eq!(normalize("بِسْمِ  اللَّهِ "), "بسم الله");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .nfc()
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split already-normalised text into words.
pub fn words(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}
