//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\iqra\
//!   macOS:   ~/Library/Application Support/iqra/
//!   Linux:   ~/.config/iqra/
//!
//! Data dir (downloaded corpus):
//!   Windows: %LOCALAPPDATA%\iqra\
//!   macOS:   ~/Library/Application Support/iqra/
//!   Linux:   ~/.local/share/iqra/

use std::path::PathBuf;

/// File name of the cached Arabic corpus XML.
pub const CORPUS_FILE_NAME: &str = "Arabic-(Original-Book)-1.xml";

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory holding downloaded data files.
    pub data_dir: PathBuf,
    /// Default location of the cached corpus XML.
    pub corpus_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "iqra";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let corpus_file = data_dir.join(CORPUS_FILE_NAME);

        Self {
            config_dir,
            settings_file,
            data_dir,
            corpus_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.data_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .corpus_file
            .file_name()
            .is_some_and(|n| n == CORPUS_FILE_NAME));
    }

    #[test]
    fn corpus_file_lives_in_data_dir() {
        let paths = AppPaths::new();
        assert_eq!(paths.corpus_file.parent(), Some(paths.data_dir.as_path()));
    }
}
