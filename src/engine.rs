//! Explicit context object tying the corpus, the locator and the translation
//! cache together.
//!
//! A [`RecitationEngine`] is built once at startup from a loaded
//! [`CorpusStore`] and passed to every caller; there is no process-wide
//! state.  Matching methods are synchronous and CPU-bound; async callers
//! should run them through `tokio::task::spawn_blocking`.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::corpus::{words, normalize, Chapter, ChapterSummary, CorpusStore};
use crate::matcher::{self, AlignmentToken, MatchResult, VerseLocator};
use crate::translation::{QuranEncProvider, TranslationCache, TranslationProvider};

/// Language code that selects the corpus text itself.
pub const SOURCE_LANGUAGE: &str = "ar";

/// Matching, alignment and lookup over one corpus snapshot.
pub struct RecitationEngine {
    corpus: Arc<CorpusStore>,
    locator: VerseLocator,
    translations: Arc<TranslationCache>,
}

impl RecitationEngine {
    pub fn new(
        corpus: Arc<CorpusStore>,
        provider: Arc<dyn TranslationProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            locator: VerseLocator::new(corpus.clone(), &config.matcher),
            translations: Arc::new(TranslationCache::new(provider, &config.translation)),
            corpus,
        }
    }

    /// Engine backed by the QuranEnc HTTP provider.
    pub fn from_config(corpus: Arc<CorpusStore>, config: &AppConfig) -> Self {
        let provider = Arc::new(QuranEncProvider::from_config(&config.translation));
        Self::new(corpus, provider, config)
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn translations(&self) -> &Arc<TranslationCache> {
        &self.translations
    }

    // -----------------------------------------------------------------------
    // Matching
    // -----------------------------------------------------------------------

    /// Locate the transcript, align it word by word against the located
    /// span, and score it.
    pub fn match_and_analyze(&self, transcript: &str) -> MatchResult {
        let found = self.locator.locate(transcript);
        let Some(span) = found.span else {
            return MatchResult::no_match();
        };

        let matched_text = span
            .verse_ids()
            .filter_map(|v| self.corpus.get_item(span.chapter_id, v))
            .collect::<Vec<_>>()
            .join(" ");

        let recited = words(&normalize(transcript));
        let canonical = words(&normalize(&matched_text));
        let alignment = matcher::align_words(&recited, &canonical);
        let accuracy_pct = matcher::accuracy(&alignment, canonical.len());

        log::debug!(
            "Matched {span} (similarity {:.3}, accuracy {accuracy_pct}%)",
            found.score
        );

        MatchResult {
            chapter_id: Some(span.chapter_id),
            verse_id_start: Some(span.verse_id_start),
            verse_id_end: Some(span.verse_id_end),
            matched_text,
            similarity_score: found.score,
            accuracy_pct,
            alignment,
        }
    }

    /// Align raw recited text against raw canonical text.  Both sides are
    /// normalised and split into words first.
    pub fn align_words(&self, recited: &str, canonical: &str) -> Vec<AlignmentToken> {
        matcher::align_words(&words(&normalize(recited)), &words(&normalize(canonical)))
    }

    // -----------------------------------------------------------------------
    // Corpus accessors
    // -----------------------------------------------------------------------

    pub fn get_verse(&self, chapter_id: u16, verse_id: u16) -> Option<&str> {
        self.corpus.get_item(chapter_id, verse_id)
    }

    pub fn list_chapters(&self) -> Vec<ChapterSummary> {
        self.corpus.list_chapters()
    }

    pub fn get_chapter(&self, chapter_id: u16) -> Option<&Chapter> {
        self.corpus.get_chapter(chapter_id)
    }

    pub fn search_verses(&self, query: &str) -> Vec<(u16, u16)> {
        self.corpus.search_verses(query)
    }

    // -----------------------------------------------------------------------
    // Translations
    // -----------------------------------------------------------------------

    /// Translation of one verse.  `"ar"` returns the corpus text; an empty
    /// or unknown language, or a failed fetch, returns an empty string.
    pub async fn get_translation(&self, chapter_id: u16, verse_id: u16, language: &str) -> String {
        let language = language.trim();
        if language.is_empty() {
            return String::new();
        }
        if language.eq_ignore_ascii_case(SOURCE_LANGUAGE) {
            return self
                .get_verse(chapter_id, verse_id)
                .unwrap_or_default()
                .to_string();
        }
        self.translations.get(chapter_id, verse_id, language).await
    }

    /// Preload every configured language on a background task.  The handle
    /// resolves to the number of chapters loaded across all languages.
    pub fn spawn_preload(self: &Arc<Self>) -> JoinHandle<usize> {
        let translations = self.translations.clone();
        tokio::spawn(async move {
            log::info!("Preloading translations in the background");
            translations.preload_all().await
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::store::sample_store;
    use crate::matcher::WordStatus;
    use crate::translation::provider::mock::MockProvider;

    fn engine_with(provider: MockProvider) -> (RecitationEngine, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let engine = RecitationEngine::new(
            Arc::new(sample_store()),
            provider.clone(),
            &AppConfig::default(),
        );
        (engine, provider)
    }

    fn engine() -> RecitationEngine {
        engine_with(MockProvider::new()).0
    }

    #[test]
    fn blank_transcript_is_no_match() {
        let result = engine().match_and_analyze("  \n ");
        assert_eq!(result, MatchResult::no_match());
    }

    #[test]
    fn exact_recitation_scores_full_marks() {
        let e = engine();
        let transcript = format!(
            "{} {}",
            e.get_verse(1, 1).unwrap(),
            e.get_verse(1, 2).unwrap()
        );

        let result = e.match_and_analyze(&transcript);
        assert_eq!(result.chapter_id, Some(1));
        assert_eq!(result.verse_id_start, Some(1));
        assert_eq!(result.verse_id_end, Some(2));
        assert!(result.similarity_score > 0.95);
        assert_eq!(result.accuracy_pct, 100.0);
        assert_eq!(result.alignment.len(), 8);
        assert!(result.alignment.iter().all(|t| t.status == WordStatus::Correct));
        assert!(result.matched_text.starts_with("بِسْمِ"));
    }

    #[test]
    fn unmarked_recitation_with_a_mistake() {
        // Al-Ikhlas 1-2, last word misheard.
        let result = engine().match_and_analyze("قل هو الله احد الله الصمت");
        assert_eq!(result.span().map(|s| s.to_string()).as_deref(), Some("Surah 112:Ayah 1-2"));

        let missed: Vec<&str> = result
            .alignment
            .iter()
            .filter(|t| t.status == WordStatus::Missed)
            .map(|t| t.word.as_str())
            .collect();
        let extra: Vec<&str> = result
            .alignment
            .iter()
            .filter(|t| t.status == WordStatus::Extra)
            .map(|t| t.word.as_str())
            .collect();
        assert_eq!(missed, ["الصمد"]);
        assert_eq!(extra, ["الصمت"]);
        // 5 of 6 canonical words.
        assert_eq!(result.accuracy_pct, 83.3);
    }

    #[test]
    fn no_overlap_is_no_match() {
        let result = engine().match_and_analyze("zzzzqqqq");
        assert!(!result.is_match());
        assert!(result.alignment.is_empty());
    }

    #[test]
    fn align_words_normalises_both_sides() {
        let tokens = engine().align_words("قُلْ هُوَ", "قل هو الله");
        let statuses: Vec<WordStatus> = tokens.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            [WordStatus::Correct, WordStatus::Correct, WordStatus::Missed]
        );
    }

    #[test]
    fn corpus_accessors() {
        let e = engine();
        assert_eq!(e.list_chapters().len(), 4);
        assert_eq!(e.get_chapter(112).map(|c| c.verses.len()), Some(4));
        assert!(e.get_chapter(113).is_none());
        assert!(e.get_verse(1, 8).is_none());
        assert!(e.search_verses("الناس").contains(&(114, 1)));
    }

    #[tokio::test]
    async fn arabic_language_returns_corpus_text() {
        let (e, provider) = engine_with(MockProvider::new());
        assert_eq!(e.get_translation(112, 1, "ar").await, "قُلْ هُوَ اللَّهُ أَحَدٌ");
        assert_eq!(e.get_translation(112, 1, "AR").await, "قُلْ هُوَ اللَّهُ أَحَدٌ");
        assert_eq!(e.get_translation(112, 9, "ar").await, "");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn empty_or_unknown_language_is_empty() {
        let (e, provider) = engine_with(MockProvider::new());
        assert_eq!(e.get_translation(1, 1, "").await, "");
        assert_eq!(e.get_translation(1, 1, "klingon").await, "");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn translation_goes_through_cache() {
        let (e, provider) = engine_with(
            MockProvider::new().with_chapter("somali_yacob", 112, &["Dheh", "Eebe", "Ma dhalin", "Ma jiro"]),
        );
        assert_eq!(e.get_translation(112, 2, "Somali").await, "Eebe");
        assert_eq!(e.get_translation(112, 4, "somali").await, "Ma jiro");
        assert_eq!(provider.calls(), 1);
        assert!(e.translations().is_populated("somali", 112));
    }

    #[tokio::test]
    async fn spawn_preload_runs_in_background() {
        let (e, provider) = engine_with(
            MockProvider::new().with_chapter("english_rwwad", 1, &["In the name of Allah"]),
        );
        let e = Arc::new(e);
        let loaded = e.spawn_preload().await.unwrap();

        // Only the one chapter the mock serves succeeds.
        assert_eq!(loaded, 1);
        assert!(e.translations().is_populated("en", 1));
        // Four languages, 114 chapters, every failure retried twice.
        assert_eq!(provider.calls(), 4 * 114 * 3 - 2);
    }
}
