//! lookup - dictionary, translation and encyclopedia lookups with a local page cache.

mod cli;
mod config;
mod database;
mod services;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, RecordKind};
use database::Store;
use services::MediaWikiSource;

/// Default log filter; the binary's crate name, and so its tracing target, is `lookup`.
const LOG_DIRECTIVE: &str = "lookup=warn";

/// Version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<ExitCode> {
    // Initialize logging; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    if cli.no_cache {
        config.database.use_saved_pages = false;
    }
    debug!("Loaded configuration: {:?}", config);

    let store = Store::open(&config.database)?;

    run(cli.command, &config, &store)
}

fn run(command: Command, config: &config::Config, store: &Store) -> Result<ExitCode> {
    let timeout = Duration::from_secs(config.lookup.timeout_secs);

    match command {
        Command::Dict { word, raw, language } => {
            let source = MediaWikiSource::new(&config.lookup.dictionary_host, timeout)?;
            let Some(page) = services::lookup_cached(store, &source, &word)? else {
                return Ok(not_found(&word));
            };

            if raw {
                println!("{}", page.text);
                return Ok(ExitCode::SUCCESS);
            }

            let language = language.as_deref().unwrap_or(&config.lookup.language);
            match services::language_section(&page.text, language) {
                Some(section) => {
                    println!("{} ({})\n\n{}", page.title, language, section);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("No {} entry for \"{}\"", language, word);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Translate { word, lang_code } => {
            let source = MediaWikiSource::new(&config.lookup.dictionary_host, timeout)?;
            let Some(page) = services::lookup_cached(store, &source, &word)? else {
                return Ok(not_found(&word));
            };

            let found = services::translations(&page.text, &lang_code);
            if found.is_empty() {
                println!("No translations of \"{}\" into {}", word, lang_code);
                return Ok(ExitCode::FAILURE);
            }

            println!("{} ({}): {}", word, lang_code, found.join(", "));
            Ok(ExitCode::SUCCESS)
        }

        Command::Wiki { title, raw } => {
            let source = MediaWikiSource::new(&config.lookup.encyclopedia_host, timeout)?;
            let Some(page) = services::lookup_uncached(store, &source, &title)? else {
                return Ok(not_found(&title));
            };

            if raw {
                println!("{}", page.text);
            } else {
                println!("{}\n\n{}", page.title, services::lead_section(&page.text));
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::History { kind, limit, json } => {
            print_history(store, kind, limit, json)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Clear { kind } => {
            match kind {
                RecordKind::Pages => store.clear_saved_pages()?,
                RecordKind::Searches => store.clear_searches()?,
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Status => {
            println!("lookup v{}", VERSION);
            println!("database:  {}", store.path().display());
            println!("pages:     {}", store.count_pages()?);
            println!("searches:  {}", store.count_searches()?);
            println!("size:      {} bytes", store.database_size()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_history(store: &Store, kind: RecordKind, limit: Option<i64>, json: bool) -> Result<()> {
    match kind {
        RecordKind::Pages => {
            let pages = store.get_saved_pages(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                for page in pages {
                    println!("{}\t{}\t{}", page.id, page.saved_at, page.name);
                }
            }
        }
        RecordKind::Searches => {
            let searches = store.get_saved_searches(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&searches)?);
            } else {
                for search in searches {
                    println!("{}\t{}\t{}", search.id, search.saved_at, search.text);
                }
            }
        }
    }
    Ok(())
}

fn not_found(word: &str) -> ExitCode {
    println!("No entry found for \"{}\"", word);
    ExitCode::FAILURE
}
