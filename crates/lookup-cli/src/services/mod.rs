//! Lookup services: fetch pages remotely, going through the local cache.

mod mediawiki;
mod wikitext;

pub use mediawiki::MediaWikiSource;
pub use wikitext::{lead_section, language_section, translations};

use anyhow::Result;
use lookup_common::Page;
use tracing::debug;

use crate::database::Store;

/// Something that can fetch a page by title.
pub trait PageSource {
    /// Fetch a page, returning `None` if it does not exist.
    fn fetch(&self, title: &str) -> Result<Option<Page>>;
}

/// Look up a page, serving it from the cache when a fresh copy exists.
///
/// The search is logged either way. Pages fetched remotely are written back
/// to the cache.
pub fn lookup_cached(store: &Store, source: &dyn PageSource, title: &str) -> Result<Option<Page>> {
    store.save_search(title)?;

    if let Some(page) = store.load_page(title)? {
        return Ok(Some(page));
    }

    let Some(page) = source.fetch(title)? else {
        debug!("No remote page for {:?}", title);
        return Ok(None);
    };

    store.save_page(&page)?;
    Ok(Some(page))
}

/// Look up a page remotely without touching the page cache. The search is still logged.
pub fn lookup_uncached(store: &Store, source: &dyn PageSource, title: &str) -> Result<Option<Page>> {
    store.save_search(title)?;
    source.fetch(title)
}
