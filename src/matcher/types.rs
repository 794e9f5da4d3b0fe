//! Result types produced by matching and alignment.

use serde::Serialize;

/// How one word of the alignment relates to the canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Recited exactly as the canonical word at this position.
    Correct,
    /// Canonical word the reciter did not produce.
    Missed,
    /// Reserved for substitution detection; the aligner never emits it.
    Incorrect,
    /// Recited word with no canonical counterpart.
    Extra,
}

impl WordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WordStatus::Correct => "correct",
            WordStatus::Missed => "missed",
            WordStatus::Incorrect => "incorrect",
            WordStatus::Extra => "extra",
        }
    }
}

/// One classified word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentToken {
    pub word: String,
    pub status: WordStatus,
    /// The canonical word this token stands for; `None` for `Extra`.
    pub canonical: Option<String>,
}

impl AlignmentToken {
    pub fn correct(word: &str) -> Self {
        Self {
            word: word.to_string(),
            status: WordStatus::Correct,
            canonical: Some(word.to_string()),
        }
    }

    pub fn missed(word: &str) -> Self {
        Self {
            word: word.to_string(),
            status: WordStatus::Missed,
            canonical: Some(word.to_string()),
        }
    }

    pub fn extra(word: &str) -> Self {
        Self {
            word: word.to_string(),
            status: WordStatus::Extra,
            canonical: None,
        }
    }
}

/// A contiguous run of verses in one chapter (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerseSpan {
    pub chapter_id: u16,
    pub verse_id_start: u16,
    pub verse_id_end: u16,
}

impl VerseSpan {
    pub fn verse_ids(&self) -> std::ops::RangeInclusive<u16> {
        self.verse_id_start..=self.verse_id_end
    }
}

impl std::fmt::Display for VerseSpan {
    /// `Surah C:Ayah S` or `Surah C:Ayah S-E`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Surah {}:Ayah {}", self.chapter_id, self.verse_id_start)?;
        if self.verse_id_end != self.verse_id_start {
            write!(f, "-{}", self.verse_id_end)?;
        }
        Ok(())
    }
}

/// Outcome of locating a transcript in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerseMatch {
    /// `None` when nothing scored above zero.
    pub span: Option<VerseSpan>,
    /// Similarity ratio in `[0, 1]`.
    pub score: f64,
}

impl VerseMatch {
    pub fn none() -> Self {
        Self {
            span: None,
            score: 0.0,
        }
    }
}

/// Full analysis of one transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub chapter_id: Option<u16>,
    pub verse_id_start: Option<u16>,
    pub verse_id_end: Option<u16>,
    /// Canonical text of the matched span, verses joined by single spaces.
    pub matched_text: String,
    pub similarity_score: f64,
    pub accuracy_pct: f64,
    pub alignment: Vec<AlignmentToken>,
}

impl MatchResult {
    /// The null-chapter result.
    pub fn no_match() -> Self {
        Self {
            chapter_id: None,
            verse_id_start: None,
            verse_id_end: None,
            matched_text: String::new(),
            similarity_score: 0.0,
            accuracy_pct: 0.0,
            alignment: Vec::new(),
        }
    }

    pub fn span(&self) -> Option<VerseSpan> {
        match (self.chapter_id, self.verse_id_start, self.verse_id_end) {
            (Some(chapter_id), Some(verse_id_start), Some(verse_id_end)) => Some(VerseSpan {
                chapter_id,
                verse_id_start,
                verse_id_end,
            }),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.chapter_id.is_some()
    }
}
