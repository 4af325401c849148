//! Raw page fetching from MediaWiki sites (Wiktionary, Wikipedia).

use anyhow::{anyhow, Context, Result};
use lookup_common::Page;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::debug;

use super::PageSource;

const USER_AGENT: &str = concat!("lookup/", env!("CARGO_PKG_VERSION"));

/// Fetches raw wikitext via `index.php?action=raw`.
pub struct MediaWikiSource {
    client: Client,
    host: String,
}

impl MediaWikiSource {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            host: host.into(),
        })
    }

    fn page_url(&self, title: &str) -> Result<Url> {
        let base = format!("https://{}/w/index.php", self.host);
        Url::parse_with_params(&base, &[("title", title), ("action", "raw")])
            .with_context(|| format!("Invalid wiki host {:?}", self.host))
    }
}

impl PageSource for MediaWikiSource {
    fn fetch(&self, title: &str) -> Result<Option<Page>> {
        let url = self.page_url(title)?;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| anyhow!("Failed to reach {}: {}", self.host, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let text = response.text().context("Failed to read page body")?;
                Ok(Some(Page::new(title, text)))
            }
            status => Err(anyhow!("{} returned {} for {:?}", self.host, status, title)),
        }
    }
}
