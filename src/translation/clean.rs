//! Cleanup of provider translation text.
//!
//! The provider prefixes entries with the verse number (`"7. …"`) and embeds
//! footnote references (`"[4]"`).  Neither belongs in displayed text.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_VERSE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*").unwrap());
static RE_FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Strip the leading verse number and footnote markers, then collapse
/// whitespace.
///
/// ```
/// use iqra::translation::clean_translation;
///
/// assert_eq!(
///     clean_translation("7. The path of those[1] You have blessed"),
///     "The path of those You have blessed"
/// );
/// ```
pub fn clean_translation(text: &str) -> String {
    let without_number = RE_VERSE_NUMBER.replace(text, "");
    let without_notes = RE_FOOTNOTE.replace_all(without_number.trim(), "");
    without_notes.split_whitespace().collect::<Vec<_>>().join(" ")
}
