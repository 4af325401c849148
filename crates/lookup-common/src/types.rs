//! Core types shared between the store and the lookup services.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A fetched page: a title and its raw wikitext body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page title, used as the cache key.
    pub title: String,
    /// Raw page text.
    pub text: String,
}

impl Page {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A cached page as listed by the history command (metadata only, no content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPage {
    /// Row identifier, stable across overwrites of the same name.
    pub id: i64,
    /// Page name.
    pub name: String,
    /// Local time of the last save.
    pub saved_at: NaiveDateTime,
}

/// A logged search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: i64,
    /// The query as typed.
    pub text: String,
    /// Local time the search was made.
    pub saved_at: NaiveDateTime,
}

/// Format used for every timestamp written to the cache database.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
