//! Lazy per-language translation cache.
//!
//! Translations are fetched a whole chapter at a time on the first miss for
//! a `(language, chapter_id)` pair.  Concurrent first accesses to the same
//! pair wait on a per-key async mutex so only one fetch goes out; once a
//! chapter is populated it is never fetched again.  A chapter whose fetch
//! fails on every attempt stays unpopulated and the next lookup retries.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::provider::TranslationProvider;
use crate::config::TranslationConfig;
use crate::corpus::CHAPTER_COUNT;

type ChapterKey = (String, u16);
type ChapterTexts = HashMap<u16, String>;

// ---------------------------------------------------------------------------
// TranslationCache
// ---------------------------------------------------------------------------

/// Memoising front of a [`TranslationProvider`].
pub struct TranslationCache {
    provider: Arc<dyn TranslationProvider>,
    /// Language code → provider translation key.
    languages: BTreeMap<String, String>,
    retries: u32,
    chapters: RwLock<HashMap<ChapterKey, Arc<ChapterTexts>>>,
    gates: Mutex<HashMap<ChapterKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl TranslationCache {
    pub fn new(provider: Arc<dyn TranslationProvider>, config: &TranslationConfig) -> Self {
        Self {
            provider,
            languages: config.languages.clone(),
            retries: config.retries,
            chapters: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Configured language codes, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Map a code or display name (`"Somali"`, `"somali"`) to a configured
    /// language code.
    pub fn resolve_language(&self, language: &str) -> Option<&str> {
        let wanted = language.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.languages
            .keys()
            .find(|code| **code == wanted || code.replace('_', " ") == wanted)
            .map(String::as_str)
    }

    /// Translation of one verse, or an empty string when the language is
    /// unknown or the chapter could not be fetched.
    pub async fn get(&self, chapter_id: u16, verse_id: u16, language: &str) -> String {
        let Some(code) = self.resolve_language(language) else {
            log::debug!("No translation source for language {language:?}");
            return String::new();
        };
        let code = code.to_string();

        if !self.ensure_chapter(&code, chapter_id).await {
            return String::new();
        }

        self.cached(&code, chapter_id)
            .and_then(|texts| texts.get(&verse_id).cloned())
            .unwrap_or_default()
    }

    /// `true` once the chapter has been fetched for `language`.
    pub fn is_populated(&self, language: &str, chapter_id: u16) -> bool {
        self.cached(language, chapter_id).is_some()
    }

    /// Populate `(language, chapter_id)` if needed.  Returns whether the
    /// chapter is available afterwards.
    pub async fn ensure_chapter(&self, language: &str, chapter_id: u16) -> bool {
        if !(1..=CHAPTER_COUNT).contains(&chapter_id) {
            log::debug!("No chapter {chapter_id}; skipping translation fetch");
            return false;
        }
        if self.is_populated(language, chapter_id) {
            return true;
        }
        let Some(translation_key) = self.languages.get(language).cloned() else {
            return false;
        };

        let key = (language.to_string(), chapter_id);
        let gate = self.gate(&key);
        let _guard = gate.lock().await;

        // Another task may have filled it while we waited.
        if self.is_populated(language, chapter_id) {
            return true;
        }

        for attempt in 0..=self.retries {
            match self.provider.fetch_chapter(&translation_key, chapter_id).await {
                Ok(entries) => {
                    let mut texts = ChapterTexts::with_capacity(entries.len());
                    for entry in entries {
                        if entry.chapter_id == chapter_id {
                            texts.insert(entry.verse_id, entry.text);
                        }
                    }
                    log::debug!(
                        "Cached {} {language} translations for chapter {chapter_id}",
                        texts.len()
                    );
                    self.chapters
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(key, Arc::new(texts));
                    return true;
                }
                Err(e) if attempt < self.retries => {
                    log::debug!(
                        "Translation fetch failed (chapter {chapter_id}, {language}, attempt {}): {e}",
                        attempt + 1
                    );
                }
                Err(e) => {
                    log::warn!("Translation fetch error (chapter {chapter_id}, {language}): {e}");
                }
            }
        }
        false
    }

    /// Fetch every chapter for one language.  Returns how many chapters are
    /// available afterwards.
    pub async fn preload_language(&self, language: &str) -> usize {
        let Some(code) = self.resolve_language(language).map(str::to_string) else {
            log::warn!("Cannot preload unknown language {language:?}");
            return 0;
        };

        let mut loaded = 0;
        for chapter_id in 1..=CHAPTER_COUNT {
            if self.ensure_chapter(&code, chapter_id).await {
                loaded += 1;
            }
        }
        log::info!("Preloaded {code} translations ({loaded}/{CHAPTER_COUNT} chapters)");
        loaded
    }

    /// Preload every configured language in turn.
    pub async fn preload_all(&self) -> usize {
        let codes: Vec<String> = self.languages.keys().cloned().collect();
        let mut total = 0;
        for code in codes {
            total += self.preload_language(&code).await;
        }
        total
    }

    fn cached(&self, language: &str, chapter_id: u16) -> Option<Arc<ChapterTexts>> {
        self.chapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(language.to_string(), chapter_id))
            .cloned()
    }

    fn gate(&self, key: &ChapterKey) -> Arc<tokio::sync::Mutex<()>> {
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::translation::provider::mock::MockProvider;

    fn config(retries: u32) -> TranslationConfig {
        TranslationConfig {
            retries,
            ..TranslationConfig::default()
        }
    }

    fn fatiha_provider() -> MockProvider {
        MockProvider::new().with_chapter(
            "english_rwwad",
            1,
            &["In the name of Allah", "All praise is for Allah", "The Most Compassionate"],
        )
    }

    fn cache_with(provider: &Arc<MockProvider>, retries: u32) -> TranslationCache {
        TranslationCache::new(provider.clone(), &config(retries))
    }

    #[tokio::test]
    async fn first_miss_fetches_once_then_memoizes() {
        let provider = Arc::new(fatiha_provider());
        let cache = cache_with(&provider, 2);

        assert_eq!(cache.get(1, 1, "en").await, "In the name of Allah");
        assert_eq!(provider.calls(), 1);

        assert_eq!(cache.get(1, 3, "en").await, "The Most Compassionate");
        assert_eq!(provider.calls(), 1);
        assert!(cache.is_populated("en", 1));
    }

    #[tokio::test]
    async fn missing_verse_in_populated_chapter_does_not_refetch() {
        let provider = Arc::new(fatiha_provider());
        let cache = cache_with(&provider, 2);

        assert_eq!(cache.get(1, 7, "en").await, "");
        assert_eq!(cache.get(1, 7, "en").await, "");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let provider = Arc::new(fatiha_provider().failing_first(2));
        let cache = cache_with(&provider, 2);

        assert_eq!(cache.get(1, 2, "en").await, "All praise is for Allah");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_leave_chapter_unpopulated() {
        let provider = Arc::new(fatiha_provider().failing_first(3));
        let cache = cache_with(&provider, 2);

        assert_eq!(cache.get(1, 1, "en").await, "");
        assert_eq!(provider.calls(), 3);
        assert!(!cache.is_populated("en", 1));

        // The next lookup fetches again and now succeeds.
        assert_eq!(cache.get(1, 1, "en").await, "In the name of Allah");
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn concurrent_first_access_collapses_into_one_fetch() {
        let provider = Arc::new(fatiha_provider().with_delay(Duration::from_millis(30)));
        let cache = cache_with(&provider, 2);

        let (a, b, c) = tokio::join!(
            cache.get(1, 1, "en"),
            cache.get(1, 2, "en"),
            cache.get(1, 3, "en"),
        );
        assert_eq!(a, "In the name of Allah");
        assert_eq!(b, "All praise is for Allah");
        assert_eq!(c, "The Most Compassionate");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn languages_are_cached_independently() {
        let provider = Arc::new(
            fatiha_provider().with_chapter("somali_yacob", 1, &["Magaca Eebe"]),
        );
        let cache = cache_with(&provider, 0);

        assert_eq!(cache.get(1, 1, "en").await, "In the name of Allah");
        assert_eq!(cache.get(1, 1, "somali").await, "Magaca Eebe");
        assert_eq!(provider.calls(), 2);
        assert!(!cache.is_populated("swahili", 1));
    }

    #[tokio::test]
    async fn display_names_resolve() {
        let provider = Arc::new(fatiha_provider());
        let cache = cache_with(&provider, 0);

        assert_eq!(cache.resolve_language("English"), None);
        assert_eq!(cache.resolve_language("Somali"), Some("somali"));
        assert_eq!(cache.resolve_language(" EN "), Some("en"));
        assert_eq!(cache.get(1, 1, "EN").await, "In the name of Allah");
    }

    #[tokio::test]
    async fn unknown_language_is_empty_without_fetch() {
        let provider = Arc::new(fatiha_provider());
        let cache = cache_with(&provider, 2);

        assert_eq!(cache.get(1, 1, "klingon").await, "");
        assert_eq!(cache.get(1, 1, "").await, "");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn out_of_range_chapter_never_fetches() {
        let provider = Arc::new(fatiha_provider());
        let cache = cache_with(&provider, 2);

        for chapter_id in [0, CHAPTER_COUNT + 1, 500, 0] {
            assert_eq!(cache.get(chapter_id, 1, "en").await, "");
        }
        assert_eq!(provider.calls(), 0);
        assert!(cache.gates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn preload_language_walks_every_chapter() {
        let provider = Arc::new(
            fatiha_provider().with_chapter("english_rwwad", 114, &["Say, I seek refuge"]),
        );
        let cache = cache_with(&provider, 0);

        let loaded = cache.preload_language("en").await;
        assert_eq!(loaded, 2);
        assert_eq!(provider.calls(), CHAPTER_COUNT as usize);

        // Preloaded chapters are served from memory.
        assert_eq!(cache.get(114, 1, "en").await, "Say, I seek refuge");
        assert_eq!(provider.calls(), CHAPTER_COUNT as usize);
    }

    #[tokio::test]
    async fn preload_unknown_language_does_nothing() {
        let provider = Arc::new(fatiha_provider());
        let cache = cache_with(&provider, 0);
        assert_eq!(cache.preload_language("latin").await, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn languages_come_from_config() {
        let provider = Arc::new(MockProvider::new());
        let cache = cache_with(&provider, 0);
        let langs: Vec<&str> = cache.languages().collect();
        assert_eq!(langs, vec!["amharic", "en", "somali", "swahili"]);
    }
}
