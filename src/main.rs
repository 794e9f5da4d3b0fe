//! `iqra` command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the corpus, downloading it on first use.  Failure is fatal.
//! 4. Build the [`RecitationEngine`] and run the requested subcommand.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use iqra::config::{AppConfig, AppPaths};
use iqra::corpus::SharedCorpus;
use iqra::matcher::{render_alignment_html, AlignmentToken};
use iqra::{MatchResult, RecitationEngine};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Match recited Quran text to verses and score the recitation.
#[derive(Parser, Debug)]
#[command(name = "iqra", version)]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default settings file
    InitConfig,

    #[command(flatten)]
    Corpus(CorpusCommand),
}

/// Subcommands that need the loaded corpus.
#[derive(Subcommand, Debug)]
enum CorpusCommand {
    /// Locate a transcript and score it word by word
    Match {
        /// Transcript text (read from stdin when omitted)
        transcript: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Print the alignment as coloured HTML
        #[arg(long)]
        html: bool,

        /// Also print the matched verses in this language
        #[arg(short, long)]
        translation: Option<String>,
    },

    /// Align recited text against canonical text without locating
    Align {
        #[arg(long)]
        recited: String,

        #[arg(long)]
        canonical: String,

        /// Print tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one verse
    Verse { chapter: u16, verse: u16 },

    /// Print the translation of one verse
    Translate {
        chapter: u16,
        verse: u16,
        /// Language code or name (`ar` for the original text)
        language: String,
    },

    /// List every chapter
    Chapters,

    /// Find verses containing a phrase (diacritics ignored)
    Search { query: String },

    /// Fetch all translations for one language, or every configured one
    Preload { language: Option<String> },
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let paths = AppPaths::new();
    let settings_file = cli.config.clone().unwrap_or_else(|| paths.settings_file.clone());

    let command = match cli.command {
        Command::InitConfig => {
            AppConfig::default()
                .save_to(&settings_file)
                .with_context(|| format!("writing {}", settings_file.display()))?;
            println!("Wrote {}", settings_file.display());
            return Ok(());
        }
        Command::Corpus(command) => command,
    };

    // 2. Configuration
    let config = AppConfig::load_from(&settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Corpus
    let corpus = SharedCorpus::new(config.corpus.clone(), paths);
    let store = corpus
        .load()
        .await
        .with_context(|| format!("corpus unavailable ({})", corpus.file().display()))?;

    // 4. Engine
    let engine = Arc::new(RecitationEngine::from_config(store, &config));
    // The preload runs alongside the command and is awaited before exit.
    let background = if config.translation.preload_on_start
        && matches!(
            command,
            CorpusCommand::Match { .. } | CorpusCommand::Translate { .. }
        ) {
        Some(engine.spawn_preload())
    } else {
        None
    };

    run(command, &engine).await?;

    if let Some(handle) = background {
        log::info!("Waiting for the translation preload to finish");
        let loaded = handle.await.context("translation preload task failed")?;
        log::info!("Translation preload finished ({loaded} chapters)");
    }
    Ok(())
}

async fn run(command: CorpusCommand, engine: &Arc<RecitationEngine>) -> Result<()> {
    match command {
        CorpusCommand::Match {
            transcript,
            json,
            html,
            translation,
        } => {
            let transcript = match transcript {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading transcript from stdin")?;
                    buf
                }
            };

            let e = Arc::clone(engine);
            let result = tokio::task::spawn_blocking(move || e.match_and_analyze(&transcript))
                .await
                .context("matching task failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result);
            }
            if html {
                println!("{}", render_alignment_html(&result.alignment, true));
            }
            if let (Some(language), Some(span)) = (translation, result.span()) {
                for verse_id in span.verse_ids() {
                    let text = engine
                        .get_translation(span.chapter_id, verse_id, &language)
                        .await;
                    println!("[{}:{verse_id}] {text}", span.chapter_id);
                }
            }
        }

        CorpusCommand::Align {
            recited,
            canonical,
            json,
        } => {
            let tokens = engine.align_words(&recited, &canonical);
            if json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                print_tokens(&tokens);
            }
        }

        CorpusCommand::Verse { chapter, verse } => match engine.get_verse(chapter, verse) {
            Some(text) => println!("{text}"),
            None => anyhow::bail!("no verse {chapter}:{verse}"),
        },

        CorpusCommand::Translate {
            chapter,
            verse,
            language,
        } => {
            let text = engine.get_translation(chapter, verse, &language).await;
            if text.is_empty() {
                log::warn!("No {language} translation available for {chapter}:{verse}");
            }
            println!("{text}");
        }

        CorpusCommand::Chapters => {
            for chapter in engine.list_chapters() {
                println!("{:>3}  {}", chapter.id, chapter.name);
            }
        }

        CorpusCommand::Search { query } => {
            let hits = engine.search_verses(&query);
            for &(chapter_id, verse_id) in &hits {
                let text = engine.get_verse(chapter_id, verse_id).unwrap_or_default();
                println!("{chapter_id}:{verse_id}  {text}");
            }
            log::info!("{} verse(s) found", hits.len());
        }

        CorpusCommand::Preload { language } => {
            let cache = engine.translations();
            let loaded = match language {
                Some(language) => cache.preload_language(&language).await,
                None => cache.preload_all().await,
            };
            println!("{loaded} chapter(s) loaded");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// `Surah C:Ayah S[-E] | Accuracy: X.X%`, or the no-match message.
fn summary_line(result: &MatchResult) -> String {
    match result.span() {
        Some(span) => format!("{span} | Accuracy: {:.1}%", result.accuracy_pct),
        None => "No verse match found.".to_string(),
    }
}

fn print_summary(result: &MatchResult) {
    println!("{}", summary_line(result));
    if result.is_match() {
        println!("{}", result.matched_text);
        print_tokens(&result.alignment);
    }
}

fn print_tokens(tokens: &[AlignmentToken]) {
    for token in tokens {
        println!("{:<9} {}", token.status.label(), token.word);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
