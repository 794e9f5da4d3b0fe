//! Acquisition of the bulk corpus resource.
//!
//! The XML file is downloaded once into the data directory; later runs read
//! the local copy.  [`SharedCorpus`] guarantees the parse happens at most
//! once per process no matter how many callers ask for the corpus.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use super::store::CorpusStore;
use super::CorpusError;
use crate::config::{AppPaths, CorpusConfig};

/// Make sure the corpus XML exists at `path`, downloading it from `url` if
/// it does not.  An existing file is never re-downloaded.
pub async fn ensure_corpus_file(
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<(), CorpusError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    log::info!("Downloading corpus from {url}");
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| CorpusError::Fetch(e.to_string()))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| CorpusError::Fetch(e.to_string()))?;

    let content = String::from_utf8(bytes.to_vec())
        .map_err(|e| CorpusError::Parse(format!("corpus is not UTF-8: {e}")))?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

    tokio::fs::write(path, content).await?;
    log::info!("Corpus saved to {}", path.display());
    Ok(())
}

/// Resolve, fetch if necessary, and parse the corpus described by `config`.
pub async fn load_corpus(config: &CorpusConfig, paths: &AppPaths) -> Result<CorpusStore, CorpusError> {
    let path = config.resolve_file(paths);
    ensure_corpus_file(
        &config.source_url,
        &path,
        Duration::from_secs(config.download_timeout_secs),
    )
    .await?;

    let store = tokio::task::spawn_blocking(move || CorpusStore::load_from(&path))
        .await
        .map_err(|e| CorpusError::Fetch(format!("corpus load task failed: {e}")))??;

    log::info!(
        "Corpus loaded: {} chapters, {} verses",
        store.chapter_count(),
        store.verse_count()
    );
    Ok(store)
}

// ---------------------------------------------------------------------------
// SharedCorpus
// ---------------------------------------------------------------------------

/// Once-only handle to the corpus snapshot.
///
/// [`load`](SharedCorpus::load) may be called any number of times: the first
/// successful call parses the corpus, later calls return the same
/// `Arc<CorpusStore>`.  A failed load leaves the cell empty so a later call
/// tries again.
pub struct SharedCorpus {
    config: CorpusConfig,
    paths: AppPaths,
    cell: OnceCell<Arc<CorpusStore>>,
}

impl SharedCorpus {
    pub fn new(config: CorpusConfig, paths: AppPaths) -> Self {
        Self {
            config,
            paths,
            cell: OnceCell::new(),
        }
    }

    /// Local path the corpus is read from.
    pub fn file(&self) -> PathBuf {
        self.config.resolve_file(&self.paths)
    }

    /// Load the corpus if it has not been loaded yet.
    pub async fn load(&self) -> Result<Arc<CorpusStore>, CorpusError> {
        self.cell
            .get_or_try_init(|| async {
                load_corpus(&self.config, &self.paths).await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// The snapshot, if a previous [`load`](SharedCorpus::load) succeeded.
    pub fn get(&self) -> Option<Arc<CorpusStore>> {
        self.cell.get().cloned()
    }
}
