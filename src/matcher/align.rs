//! Word-level alignment of a recitation against canonical text.

use super::diff::{BlockMatcher, Tag};
use super::types::AlignmentToken;

/// Classify every recited and canonical word.
///
/// Both inputs are normalised words.  The canonical words are the base
/// sequence of the edit script; the recited words are compared against it.
///
/// * equal run → each word `Correct`
/// * delete run, or canonical side of a replace → each word `Missed`
/// * insert run, or recited side of a replace → each word `Extra`
///
/// Within a replace run all `Missed` tokens precede all `Extra` tokens.
/// Every canonical word appears exactly once (Correct or Missed) and every
/// recited word exactly once (Correct or Extra).
///
/// ```
/// use iqra::matcher::{align_words, WordStatus};
///
/// let tokens = align_words(&["a", "x", "c"], &["a", "b", "c"]);
/// let statuses: Vec<_> = tokens.iter().map(|t| t.status).collect();
/// assert_eq!(
///     statuses,
///     [WordStatus::Correct, WordStatus::Missed, WordStatus::Extra, WordStatus::Correct]
/// );
/// ```
pub fn align_words<R, C>(recited: &[R], canonical: &[C]) -> Vec<AlignmentToken>
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    if recited.is_empty() && canonical.is_empty() {
        return Vec::new();
    }

    let recited: Vec<&str> = recited.iter().map(AsRef::as_ref).collect();
    let canonical: Vec<&str> = canonical.iter().map(AsRef::as_ref).collect();

    let matcher = BlockMatcher::new(recited.clone());
    let mut tokens = Vec::with_capacity(recited.len().max(canonical.len()));

    for op in matcher.opcodes(&canonical) {
        let base = &canonical[op.a_range.clone()];
        let said = &recited[op.b_range.clone()];
        match op.tag {
            Tag::Equal => tokens.extend(base.iter().map(|w| AlignmentToken::correct(w))),
            Tag::Delete => tokens.extend(base.iter().map(|w| AlignmentToken::missed(w))),
            Tag::Insert => tokens.extend(said.iter().map(|w| AlignmentToken::extra(w))),
            Tag::Replace => {
                tokens.extend(base.iter().map(|w| AlignmentToken::missed(w)));
                tokens.extend(said.iter().map(|w| AlignmentToken::extra(w)));
            }
        }
    }
    tokens
}
