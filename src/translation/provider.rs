//! Remote translation-by-chapter provider.
//!
//! [`TranslationProvider`] is the seam between the cache and the network.
//! [`QuranEncProvider`] speaks the QuranEnc JSON API:
//! `GET {base_url}/{translation_key}/{chapter_id}` returning
//! `{"result": [{"sura": "1", "aya": "1", "translation": "…"}, …]}`.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use super::clean::clean_translation;
use super::TranslationError;
use crate::config::TranslationConfig;

// ---------------------------------------------------------------------------
// TranslationEntry
// ---------------------------------------------------------------------------

/// One cleaned translation keyed by `(chapter_id, verse_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub chapter_id: u16,
    pub verse_id: u16,
    pub text: String,
}

// ---------------------------------------------------------------------------
// TranslationProvider trait
// ---------------------------------------------------------------------------

/// Fetches every translated verse of one chapter.
///
/// Implementors must be `Send + Sync` so the cache can be shared across
/// tasks.  Returned text is expected to be cleaned already.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn fetch_chapter(
        &self,
        translation_key: &str,
        chapter_id: u16,
    ) -> Result<Vec<TranslationEntry>, TranslationError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChapterResponse {
    #[serde(default)]
    result: Vec<WireEntry>,
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    #[serde(default, deserialize_with = "number_or_string")]
    sura: Option<u16>,
    #[serde(default, deserialize_with = "number_or_string")]
    aya: Option<u16>,
    #[serde(default)]
    translation: Option<String>,
}

/// The API encodes numbers as strings; accept both.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u16),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(Some(n)),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number {s:?}"))),
        Raw::Null => Ok(None),
    }
}

/// Decode a chapter response body into cleaned entries.
///
/// A missing `sura` falls back to the requested chapter; entries without an
/// `aya` number are skipped.
pub fn parse_chapter(body: &str, chapter_id: u16) -> Result<Vec<TranslationEntry>, TranslationError> {
    let response: ChapterResponse =
        serde_json::from_str(body).map_err(|e| TranslationError::Parse(e.to_string()))?;

    Ok(response
        .result
        .into_iter()
        .filter_map(|item| {
            let verse_id = item.aya.filter(|&a| a > 0)?;
            Some(TranslationEntry {
                chapter_id: item.sura.unwrap_or(chapter_id),
                verse_id,
                text: clean_translation(item.translation.as_deref().unwrap_or("")),
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// QuranEncProvider
// ---------------------------------------------------------------------------

/// HTTP provider for the QuranEnc translation API.
pub struct QuranEncProvider {
    client: reqwest::Client,
    base_url: String,
}

impl QuranEncProvider {
    /// Build a provider from config; the client carries the per-request
    /// timeout.
    pub fn from_config(config: &TranslationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chapter_url(&self, translation_key: &str, chapter_id: u16) -> String {
        format!("{}/{translation_key}/{chapter_id}", self.base_url)
    }
}

#[async_trait]
impl TranslationProvider for QuranEncProvider {
    async fn fetch_chapter(
        &self,
        translation_key: &str,
        chapter_id: u16,
    ) -> Result<Vec<TranslationEntry>, TranslationError> {
        let url = self.chapter_url(translation_key, chapter_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_chapter(&body, chapter_id)
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Serves fixed chapters, counts calls, and can fail the first N calls.
    pub struct MockProvider {
        pub chapters: HashMap<(String, u16), Vec<TranslationEntry>>,
        pub calls: AtomicUsize,
        pub fail_first: usize,
        pub delay: Option<Duration>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                chapters: HashMap::new(),
                calls: AtomicUsize::new(0),
                fail_first: 0,
                delay: None,
            }
        }

        pub fn with_chapter(mut self, key: &str, chapter_id: u16, verses: &[&str]) -> Self {
            let entries = verses
                .iter()
                .enumerate()
                .map(|(i, text)| TranslationEntry {
                    chapter_id,
                    verse_id: i as u16 + 1,
                    text: text.to_string(),
                })
                .collect();
            self.chapters.insert((key.to_string(), chapter_id), entries);
            self
        }

        pub fn failing_first(mut self, n: usize) -> Self {
            self.fail_first = n;
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for MockProvider {
        async fn fetch_chapter(
            &self,
            translation_key: &str,
            chapter_id: u16,
        ) -> Result<Vec<TranslationEntry>, TranslationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if n < self.fail_first {
                return Err(TranslationError::Request("connection refused".into()));
            }
            self.chapters
                .get(&(translation_key.to_string(), chapter_id))
                .cloned()
                .ok_or(TranslationError::Status(404))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
