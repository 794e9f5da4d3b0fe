//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// CorpusConfig
// ---------------------------------------------------------------------------

/// Where the canonical Arabic text comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// URL of the bulk XML resource, downloaded once when no local copy exists.
    pub source_url: String,
    /// Explicit path of the local XML copy.  `None` means
    /// [`AppPaths::corpus_file`].
    pub file: Option<PathBuf>,
    /// Maximum seconds to wait for the bulk download.
    pub download_timeout_secs: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            source_url: "https://raw.githubusercontent.com/ceefour/qurandatabase/master/Arabic-(Original-Book)-1.xml".into(),
            file: None,
            download_timeout_secs: 30,
        }
    }
}

impl CorpusConfig {
    /// Resolve the local XML path, honouring the `file` override.
    pub fn resolve_file(&self, paths: &AppPaths) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| paths.corpus_file.clone())
    }
}

// ---------------------------------------------------------------------------
// TranslationConfig
// ---------------------------------------------------------------------------

/// Settings for the remote translation-by-chapter provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Base URL; requests go to `{base_url}/{translation_key}/{chapter_id}`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Additional attempts after a failed chapter fetch.
    pub retries: u32,
    /// Language code → provider translation key.
    pub languages: BTreeMap<String, String>,
    /// Start the background preload of every language at startup.
    pub preload_on_start: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let languages = [
            ("en", "english_rwwad"),
            ("somali", "somali_yacob"),
            ("amharic", "amharic_sadiq"),
            ("swahili", "swahili_rwwad"),
        ]
        .into_iter()
        .map(|(lang, key)| (lang.to_string(), key.to_string()))
        .collect();

        Self {
            base_url: "https://quranenc.com/api/v1/translation/sura".into(),
            timeout_secs: 20,
            retries: 2,
            languages,
            preload_on_start: false,
        }
    }
}

// ---------------------------------------------------------------------------
// MatcherConfig
// ---------------------------------------------------------------------------

/// Tuning knobs of the verse locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Largest number of consecutive verses tried as one candidate.
    pub max_window: usize,
    /// A window scoring strictly above this ratio ends the search at once.
    pub early_exit_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_window: 6,
            early_exit_threshold: 0.95,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use iqra::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Canonical corpus source.
    pub corpus: CorpusConfig,
    /// Translation provider and cache settings.
    pub translation: TranslationConfig,
    /// Verse locator settings.
    pub matcher: MatcherConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
