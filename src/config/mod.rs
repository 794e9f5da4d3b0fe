//! Configuration module for the recitation matcher.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::{AppPaths, CORPUS_FILE_NAME};
pub use settings::{AppConfig, CorpusConfig, MatcherConfig, TranslationConfig};
