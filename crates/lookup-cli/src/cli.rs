//! Command-line interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "lookup",
    version,
    about = "Dictionary, translation and encyclopedia lookups with a local page cache"
)]
pub struct Cli {
    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Ignore cached pages for this invocation.
    #[arg(long, global = true)]
    pub no_cache: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a word in the dictionary.
    #[command(visible_alias = "d", alias = "dictionary")]
    Dict {
        word: String,
        /// Print the whole page as wikitext.
        #[arg(short, long)]
        raw: bool,
        /// Language section to print (defaults to the configured language).
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Translate a word using dictionary translation tables.
    #[command(visible_alias = "t", alias = "tr")]
    Translate {
        word: String,
        /// Target language code, e.g. "fr" or "de".
        lang_code: String,
    },
    /// Look up an encyclopedia article.
    #[command(visible_alias = "w", alias = "wikipedia")]
    Wiki {
        title: String,
        /// Print the whole article as wikitext.
        #[arg(short, long)]
        raw: bool,
    },
    /// List saved pages or searches.
    History {
        kind: RecordKind,
        /// Only show the newest N records, newest first.
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete all saved pages or searches.
    Clear { kind: RecordKind },
    /// Show cache location and record counts.
    Status,
}

/// The two kinds of records kept in the cache database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Pages,
    Searches,
}
