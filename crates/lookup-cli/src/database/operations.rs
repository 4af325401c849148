//! Database operations for the page cache and search log.

use chrono::{Local, NaiveDateTime};
use lookup_common::{Page, SavedPage, SavedSearch, TIMESTAMP_FORMAT};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{schema, Result, StoreError};
use crate::config::DatabaseConfig;

/// Handle to the cache database.
///
/// Reads and writes are gated by the toggles of the [`DatabaseConfig`] the
/// store was opened with.
pub struct Store {
    conn: Connection,
    path: PathBuf,
    save_searches: bool,
    save_pages: bool,
    use_saved_pages: bool,
    expiration_secs: i64,
}

impl Store {
    /// Open the database described by `config`, expanding its directory path.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        Self::open_in(&config.expanded_directory(), config)
    }

    /// Open the database inside `dir`, creating the directory and tables as needed.
    pub fn open_in(dir: &Path, config: &DatabaseConfig) -> Result<Self> {
        let expiration = lookup_common::parse_duration_secs(&config.page_expiration_time)
            .map_err(|source| StoreError::Expiration {
                value: config.page_expiration_time.clone(),
                source,
            })?;

        std::fs::create_dir_all(dir)?;
        let path = dir.join(&config.file_name);
        let conn = Connection::open(&path)?;

        let store = Self {
            conn,
            path,
            save_searches: config.save_searches,
            save_pages: config.save_pages,
            use_saved_pages: config.use_saved_pages,
            expiration_secs: i64::try_from(expiration).unwrap_or(i64::MAX),
        };
        store.migrate()?;

        info!("Opened page cache at {:?}", store.path);
        Ok(store)
    }

    /// Create tables and indexes. Safe to run against an initialized database.
    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(schema::CREATE_PAGES_TABLE)?;
        self.conn.execute_batch(schema::CREATE_SEARCHES_TABLE)?;
        self.conn.execute_batch(schema::CREATE_INDEXES)?;
        Ok(())
    }

    /// Log a search.
    pub fn save_search(&self, text: &str) -> Result<()> {
        if !self.save_searches {
            return Ok(());
        }

        self.conn.execute(
            "INSERT INTO searches (text, saved_at) VALUES (?1, ?2)",
            params![text, now_string()],
        )?;
        Ok(())
    }

    /// Save a page, replacing content and timestamp of an existing page with the same name.
    pub fn save_page(&self, page: &Page) -> Result<()> {
        if !self.save_pages {
            debug!("Page saving disabled, not caching {:?}", page.title);
            return Ok(());
        }

        // The conflict branch keeps the existing row id
        self.conn.execute(
            "INSERT INTO pages (name, content, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET content = excluded.content, saved_at = excluded.saved_at",
            params![page.title, page.text, now_string()],
        )?;

        debug!("Cached page {:?} ({} bytes)", page.title, page.text.len());
        Ok(())
    }

    /// Load a fresh page by exact name.
    ///
    /// Returns `None` when cached pages are disabled, the page was never saved,
    /// or it is older than the expiration time. Stale pages stay in the database.
    pub fn load_page(&self, name: &str) -> Result<Option<Page>> {
        if !self.use_saved_pages {
            return Ok(None);
        }

        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT content, saved_at FROM pages WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((content, saved_at)) = row else {
            debug!("Cache miss for {:?}", name);
            return Ok(None);
        };

        if self.page_needs_update(parse_timestamp(saved_at)?) {
            debug!("Cached page {:?} is stale", name);
            return Ok(None);
        }

        debug!("Cache hit for {:?}", name);
        Ok(Some(Page::new(name, content)))
    }

    /// Whether a page saved at `saved_at` is older than the expiration time.
    pub fn page_needs_update(&self, saved_at: NaiveDateTime) -> bool {
        self.is_stale(saved_at, Local::now().naive_local())
    }

    fn is_stale(&self, saved_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        (now - saved_at).num_seconds() > self.expiration_secs
    }

    /// Get saved pages.
    ///
    /// Without a limit all pages are returned oldest first; with a limit the
    /// newest `limit` pages are returned newest first.
    pub fn get_saved_pages(&self, limit: Option<i64>) -> Result<Vec<SavedPage>> {
        let rows = self.select_rows("SELECT id, name, saved_at FROM pages", limit)?;

        rows.into_iter()
            .map(|(id, name, saved_at)| -> Result<SavedPage> {
                Ok(SavedPage {
                    id,
                    name,
                    saved_at: parse_timestamp(saved_at)?,
                })
            })
            .collect()
    }

    /// Get saved searches, ordered like [`Store::get_saved_pages`].
    pub fn get_saved_searches(&self, limit: Option<i64>) -> Result<Vec<SavedSearch>> {
        let rows = self.select_rows("SELECT id, text, saved_at FROM searches", limit)?;

        rows.into_iter()
            .map(|(id, text, saved_at)| -> Result<SavedSearch> {
                Ok(SavedSearch {
                    id,
                    text,
                    saved_at: parse_timestamp(saved_at)?,
                })
            })
            .collect()
    }

    fn select_rows(&self, select: &str, limit: Option<i64>) -> Result<Vec<(i64, String, String)>> {
        let rows = match limit {
            None => {
                let mut stmt = self.conn.prepare(&format!("{select} ORDER BY id ASC"))?;
                let rows = stmt.query_map([], row_triple)?.collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            Some(limit) if limit <= 0 => return Err(StoreError::InvalidLimit(limit)),
            Some(limit) => {
                let mut stmt = self.conn.prepare(&format!("{select} ORDER BY id DESC LIMIT ?1"))?;
                let rows = stmt
                    .query_map(params![limit], row_triple)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };

        Ok(rows)
    }

    /// Remove all logged searches.
    pub fn clear_searches(&self) -> Result<()> {
        let rows = self.conn.execute("DELETE FROM searches", [])?;
        info!("Cleared {} searches", rows);
        Ok(())
    }

    /// Remove all cached pages.
    pub fn clear_saved_pages(&self) -> Result<()> {
        let rows = self.conn.execute("DELETE FROM pages", [])?;
        info!("Cleared {} saved pages", rows);
        Ok(())
    }

    /// Count cached pages, fresh or stale.
    pub fn count_pages(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count logged searches.
    pub fn count_searches(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Get database size in bytes.
    pub fn database_size(&self) -> Result<u64> {
        let metadata = std::fs::metadata(&self.path)?;
        Ok(metadata.len())
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn row_triple(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn now_string() -> String {
    Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(value: String) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
        .map_err(|source| StoreError::Timestamp { value, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn test_config() -> DatabaseConfig {
        DatabaseConfig {
            file_name: "test.db".to_string(),
            page_expiration_time: "1h".to_string(),
            ..DatabaseConfig::default()
        }
    }

    fn test_store(config: DatabaseConfig) -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in(dir.path(), &config).unwrap();
        (dir, store)
    }

    /// Rewrite a page's timestamp to `age_secs` seconds ago.
    fn backdate_page(store: &Store, name: &str, age_secs: i64) {
        let saved_at = Local::now().naive_local() - Duration::seconds(age_secs);
        store
            .conn
            .execute(
                "UPDATE pages SET saved_at = ?1 WHERE name = ?2",
                params![saved_at.format(TIMESTAMP_FORMAT).to_string(), name],
            )
            .unwrap();
    }

    fn page_row(store: &Store, name: &str) -> Option<(i64, String)> {
        store
            .conn
            .query_row(
                "SELECT id, content FROM pages WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .unwrap()
    }

    #[test]
    fn test_open_creates_directory_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = test_config();

        let store = Store::open_in(&nested, &config).unwrap();
        store.save_page(&Page::new("kot", "cat")).unwrap();
        assert_eq!(store.path(), nested.join("test.db"));
        drop(store);

        let store = Store::open_in(&nested, &config).unwrap();
        assert_eq!(store.load_page("kot").unwrap(), Some(Page::new("kot", "cat")));
    }

    #[test]
    fn test_open_expands_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            directory_path: dir.path().join("cache").to_string_lossy().into_owned(),
            ..test_config()
        };

        let store = Store::open(&config).unwrap();
        assert!(dir.path().join("cache").join("test.db").exists());
        assert_eq!(store.count_pages().unwrap(), 0);
    }

    #[test]
    fn test_open_keeps_unset_variables_literally() {
        let dir = tempfile::tempdir().unwrap();
        let literal = dir.path().join("$LOOKUP_TEST_UNSET_CACHE_VAR");
        let config = DatabaseConfig {
            directory_path: literal.to_string_lossy().into_owned(),
            ..test_config()
        };

        let store = Store::open(&config).unwrap();
        assert_eq!(store.path(), literal.join("test.db"));
        assert!(literal.is_dir());
    }

    #[test]
    fn test_search_timestamp_is_local_now() {
        let (_dir, store) = test_store(test_config());
        let before = Local::now().naive_local();
        store.save_search("cat").unwrap();

        let searches = store.get_saved_searches(None).unwrap();
        let age = (before - searches[0].saved_at).num_seconds().abs();
        assert!(age <= 2, "search saved {age}s away from local now");

        let raw: String = store
            .conn
            .query_row("SELECT saved_at FROM searches WHERE id = ?1", params![searches[0].id], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(raw.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_open_rejects_bad_expiration() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            page_expiration_time: "soon".to_string(),
            ..test_config()
        };

        let result = Store::open_in(dir.path(), &config);
        assert!(matches!(result, Err(StoreError::Expiration { .. })));
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = test_store(test_config());
        let page = Page::new("Haus", "==German==\n===Noun===\nhouse");

        store.save_page(&page).unwrap();
        assert_eq!(store.load_page("Haus").unwrap(), Some(page));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let (_dir, store) = test_store(test_config());
        store.save_page(&Page::new("Rust", "language")).unwrap();

        assert!(store.load_page("rust").unwrap().is_none());
        assert!(store.load_page("Rust").unwrap().is_some());
    }

    #[test]
    fn test_save_page_upserts_by_name() {
        let (_dir, store) = test_store(test_config());

        store.save_page(&Page::new("word", "first")).unwrap();
        store.save_page(&Page::new("other", "unrelated")).unwrap();
        let (first_id, _) = page_row(&store, "word").unwrap();

        backdate_page(&store, "word", 7200);
        assert!(store.load_page("word").unwrap().is_none());

        store.save_page(&Page::new("word", "second")).unwrap();

        assert_eq!(page_row(&store, "word"), Some((first_id, "second".to_string())));
        assert_eq!(store.count_pages().unwrap(), 2);
        // Overwrite refreshes the timestamp
        assert_eq!(store.load_page("word").unwrap(), Some(Page::new("word", "second")));
    }

    #[test]
    fn test_expiration_boundary() {
        let (_dir, store) = test_store(test_config());
        store.save_page(&Page::new("page", "text")).unwrap();

        backdate_page(&store, "page", 3599);
        assert!(store.load_page("page").unwrap().is_some());

        backdate_page(&store, "page", 3601);
        assert!(store.load_page("page").unwrap().is_none());

        // Stale pages are hidden, not deleted
        assert!(page_row(&store, "page").is_some());
    }

    #[test]
    fn test_page_needs_update_is_strict() {
        let (_dir, store) = test_store(test_config());
        let now = Local::now().naive_local();

        assert!(!store.is_stale(now - Duration::seconds(3599), now));
        assert!(!store.is_stale(now - Duration::seconds(3600), now));
        assert!(store.is_stale(now - Duration::seconds(3601), now));
        assert!(store.is_stale(now - Duration::days(3), now));

        assert!(!store.page_needs_update(now));
        assert!(store.page_needs_update(now - Duration::hours(2)));
    }

    #[test]
    fn test_save_pages_disabled() {
        let (_dir, store) = test_store(DatabaseConfig {
            save_pages: false,
            ..test_config()
        });

        store.save_page(&Page::new("word", "text")).unwrap();
        assert!(store.load_page("word").unwrap().is_none());
        assert_eq!(store.count_pages().unwrap(), 0);
    }

    #[test]
    fn test_use_saved_pages_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Store::open_in(dir.path(), &test_config()).unwrap();
        writer.save_page(&Page::new("word", "text")).unwrap();
        assert!(writer.load_page("word").unwrap().is_some());
        drop(writer);

        let reader = Store::open_in(
            dir.path(),
            &DatabaseConfig {
                use_saved_pages: false,
                ..test_config()
            },
        )
        .unwrap();
        assert!(reader.load_page("word").unwrap().is_none());
        assert_eq!(reader.count_pages().unwrap(), 1);
    }

    #[test]
    fn test_save_searches_toggle() {
        let (_dir, store) = test_store(test_config());
        store.save_search("cat").unwrap();
        store.save_search("cat").unwrap();
        assert_eq!(store.count_searches().unwrap(), 2);

        let (_dir, store) = test_store(DatabaseConfig {
            save_searches: false,
            ..test_config()
        });
        store.save_search("cat").unwrap();
        assert_eq!(store.count_searches().unwrap(), 0);
        assert!(store.get_saved_searches(None).unwrap().is_empty());
    }

    #[test]
    fn test_listing_order_flips_with_limit() {
        let (_dir, store) = test_store(test_config());
        for name in ["A", "B", "C"] {
            store.save_page(&Page::new(name, "text")).unwrap();
            store.save_search(name).unwrap();
        }

        let names: Vec<_> = store
            .get_saved_pages(None)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);

        let names: Vec<_> = store
            .get_saved_pages(Some(2))
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["C", "B"]);

        let texts: Vec<_> = store
            .get_saved_searches(Some(5))
            .unwrap()
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, ["C", "B", "A"]);

        let searches = store.get_saved_searches(None).unwrap();
        assert!(searches.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_empty_listings() {
        let (_dir, store) = test_store(test_config());
        assert!(store.get_saved_pages(None).unwrap().is_empty());
        assert!(store.get_saved_pages(Some(3)).unwrap().is_empty());
        assert!(store.get_saved_searches(None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_limit() {
        let (_dir, store) = test_store(test_config());
        store.save_search("cat").unwrap();

        assert!(matches!(
            store.get_saved_searches(Some(0)),
            Err(StoreError::InvalidLimit(0))
        ));
        assert!(matches!(
            store.get_saved_searches(Some(-1)),
            Err(StoreError::InvalidLimit(-1))
        ));
        assert!(matches!(
            store.get_saved_pages(Some(0)),
            Err(StoreError::InvalidLimit(0))
        ));
    }

    #[test]
    fn test_clear_only_touches_its_own_table() {
        let (_dir, store) = test_store(test_config());
        store.save_page(&Page::new("word", "text")).unwrap();
        store.save_search("word").unwrap();

        store.clear_saved_pages().unwrap();
        assert_eq!(store.count_pages().unwrap(), 0);
        assert_eq!(store.count_searches().unwrap(), 1);

        store.save_page(&Page::new("word", "text")).unwrap();
        store.clear_searches().unwrap();
        assert_eq!(store.count_pages().unwrap(), 1);
        assert_eq!(store.count_searches().unwrap(), 0);
    }

    #[test]
    fn test_database_size() {
        let (_dir, store) = test_store(test_config());
        assert!(store.database_size().unwrap() > 0);
    }
}
