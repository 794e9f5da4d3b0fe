//! Coloured HTML markup for an alignment.

use super::types::{AlignmentToken, WordStatus};

fn colour(status: WordStatus) -> &'static str {
    match status {
        WordStatus::Correct => "#22c55e",
        WordStatus::Missed | WordStatus::Incorrect => "#ef4444",
        WordStatus::Extra => "#f59e0b",
    }
}

fn escape(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// One bold `<span>` per token, space separated.  With `rtl` the spans are
/// wrapped in a right-to-left `<div>` for Arabic display.
pub fn render_alignment_html(tokens: &[AlignmentToken], rtl: bool) -> String {
    let inner = tokens
        .iter()
        .map(|t| {
            format!(
                r#"<span style="color:{};font-weight:bold;">{}</span>"#,
                colour(t.status),
                escape(&t.word)
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    if rtl {
        format!(r#"<div dir="rtl" style="text-align: right;">{inner}</div>"#)
    } else {
        inner
    }
}
