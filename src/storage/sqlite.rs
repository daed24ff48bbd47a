//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::SiteStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LemmaRecord, PageRecord, SiteRecord};
use crate::LemmaSearchError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Upper bound on values bound into a single `IN (...)` list
const IN_LIST_CHUNK: usize = 500;

const SITE_COLUMNS: &str = "id, url, name, status, status_time, last_error";
const PAGE_COLUMNS: &str = "id, site_id, path, code, content";
const LEMMA_COLUMNS: &str = "id, site_id, lemma, frequency";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(LemmaSearchError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, LemmaSearchError> {
        let conn = Connection::open(path).map_err(StorageError::from)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(StorageError::from)?;

        initialize_schema(&conn).map_err(StorageError::from)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, LemmaSearchError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StorageError::from)?;
        initialize_schema(&conn).map_err(StorageError::from)?;
        Ok(Self { conn })
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SiteStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SiteStatus::Failed),
        status_time: parse_timestamp(&row.get::<_, String>(4)?),
        last_error: row.get(5)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        path: row.get(2)?,
        code: row.get(3)?,
        content: row.get(4)?,
    })
}

fn lemma_from_row(row: &Row<'_>) -> rusqlite::Result<LemmaRecord> {
    Ok(LemmaRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        lemma: row.get(2)?,
        frequency: row.get(3)?,
    })
}

/// Builds `?{first}, ?{first + 1}, ...` for `count` parameters
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Storage for SqliteStorage {
    // ===== Site Management =====

    fn create_site(
        &mut self,
        url: &str,
        name: &str,
        status: SiteStatus,
    ) -> StorageResult<SiteRecord> {
        let status_time = Utc::now();
        self.conn.execute(
            "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
            params![url, name, status.to_db_string(), status_time.to_rfc3339()],
        )?;

        Ok(SiteRecord {
            id: self.conn.last_insert_rowid(),
            url: url.to_string(),
            name: name.to_string(),
            status,
            status_time,
            last_error: None,
        })
    }

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE id = ?1", SITE_COLUMNS),
                params![site_id],
                site_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::SiteNotFound(format!("Site ID {}", site_id)))
    }

    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let site = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE url = ?1", SITE_COLUMNS),
                params![url],
                site_from_row,
            )
            .optional()?;
        Ok(site)
    }

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS))?;
        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn update_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2, last_error = ?3 WHERE id = ?4",
            params![status.to_db_string(), now(), last_error, site_id],
        )?;
        Ok(())
    }

    fn touch_site(&mut self, site_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE sites SET status_time = ?1 WHERE id = ?2",
            params![now(), site_id],
        )?;
        Ok(())
    }

    fn delete_sites_by_url(&mut self, urls: &[String]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut deleted = 0;
        for url in urls {
            deleted += tx.execute("DELETE FROM sites WHERE url = ?1", params![url])?;
        }
        tx.commit()?;
        Ok(deleted)
    }

    // ===== Page Management =====

    fn claim_page(&mut self, site_id: i64, path: &str) -> StorageResult<i64> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO pages (site_id, path) VALUES (?1, ?2)",
            params![site_id, path],
        )?;

        if inserted == 0 {
            return Err(StorageError::DuplicatePage {
                site_id,
                path: path.to_string(),
            });
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_page(
        &mut self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
    ) -> StorageResult<i64> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO pages (site_id, path, code, content) VALUES (?1, ?2, ?3, ?4)",
            params![site_id, path, code, content],
        )?;

        if inserted == 0 {
            return Err(StorageError::DuplicatePage {
                site_id,
                path: path.to_string(),
            });
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn update_page(&mut self, page_id: i64, code: u16, content: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE pages SET code = ?1, content = ?2 WHERE id = ?3",
            params![code, content, page_id],
        )?;

        if updated == 0 {
            return Err(StorageError::PageNotFound(format!("Page ID {}", page_id)));
        }
        Ok(())
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
                params![page_id],
                page_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::PageNotFound(format!("Page ID {}", page_id)))
    }

    fn find_page(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM pages WHERE site_id = ?1 AND path = ?2",
                    PAGE_COLUMNS
                ),
                params![site_id, path],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn delete_page(&mut self, page_id: i64) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM pages WHERE id = ?1", params![page_id])?;
        Ok(())
    }

    fn existing_paths(&self, site_id: i64, paths: &[String]) -> StorageResult<HashSet<String>> {
        let mut existing = HashSet::new();

        for chunk in paths.chunks(IN_LIST_CHUNK) {
            let sql = format!(
                "SELECT path FROM pages WHERE site_id = ?1 AND path IN ({})",
                placeholders(2, chunk.len())
            );
            let mut values: Vec<&dyn ToSql> = vec![&site_id];
            values.extend(chunk.iter().map(|p| p as &dyn ToSql));

            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(values.as_slice(), |row| row.get::<_, String>(0))?;
            for row in rows {
                existing.insert(row?);
            }
        }

        Ok(existing)
    }

    fn count_pages(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Lemma Index =====

    fn record_page_lemmas(
        &mut self,
        site_id: i64,
        page_id: i64,
        lemmas: &HashMap<String, u32>,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 1)
                 ON CONFLICT(site_id, lemma) DO UPDATE SET frequency = frequency + 1
                 RETURNING id",
            )?;
            let mut posting =
                tx.prepare("INSERT INTO indexes (page_id, lemma_id, rank) VALUES (?1, ?2, ?3)")?;

            for (lemma, count) in lemmas {
                let lemma_id: i64 = upsert.query_row(params![site_id, lemma], |row| row.get(0))?;
                posting.execute(params![page_id, lemma_id, *count as f64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn deindex_page(&mut self, page_id: i64) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let decremented = tx.execute(
            "UPDATE lemmas SET frequency = frequency - 1
             WHERE id IN (SELECT lemma_id FROM indexes WHERE page_id = ?1)",
            params![page_id],
        )?;
        tx.execute(
            "DELETE FROM lemmas WHERE frequency < 1
             AND id IN (SELECT lemma_id FROM indexes WHERE page_id = ?1)",
            params![page_id],
        )?;
        tx.execute("DELETE FROM indexes WHERE page_id = ?1", params![page_id])?;
        tx.commit()?;
        Ok(decremented)
    }

    fn find_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
                    LEMMA_COLUMNS
                ),
                params![site_id, lemma],
                lemma_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn find_lemmas(&self, site_id: i64, lemmas: &[String]) -> StorageResult<Vec<LemmaRecord>> {
        let mut records = Vec::new();

        for chunk in lemmas.chunks(IN_LIST_CHUNK) {
            let sql = format!(
                "SELECT {} FROM lemmas WHERE site_id = ?1 AND lemma IN ({})",
                LEMMA_COLUMNS,
                placeholders(2, chunk.len())
            );
            let mut values: Vec<&dyn ToSql> = vec![&site_id];
            values.extend(chunk.iter().map(|l| l as &dyn ToSql));

            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(values.as_slice(), lemma_from_row)?;
            for row in rows {
                records.push(row?);
            }
        }

        Ok(records)
    }

    fn pages_for_lemma(&self, lemma_id: i64) -> StorageResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT page_id FROM indexes WHERE lemma_id = ?1 ORDER BY page_id")?;
        let pages = stmt
            .query_map(params![lemma_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn pages_for_lemma_among(&self, lemma_id: i64, page_ids: &[i64]) -> StorageResult<Vec<i64>> {
        let mut pages = Vec::new();

        for chunk in page_ids.chunks(IN_LIST_CHUNK) {
            let sql = format!(
                "SELECT page_id FROM indexes WHERE lemma_id = ?1 AND page_id IN ({}) ORDER BY page_id",
                placeholders(2, chunk.len())
            );
            let mut values: Vec<&dyn ToSql> = vec![&lemma_id];
            values.extend(chunk.iter().map(|p| p as &dyn ToSql));

            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(values.as_slice(), |row| row.get::<_, i64>(0))?;
            for row in rows {
                pages.push(row?);
            }
        }

        Ok(pages)
    }

    fn sum_ranks(&self, page_id: i64, lemma_ids: &[i64]) -> StorageResult<f64> {
        let mut total = 0.0;

        for chunk in lemma_ids.chunks(IN_LIST_CHUNK) {
            let sql = format!(
                "SELECT COALESCE(SUM(rank), 0.0) FROM indexes WHERE page_id = ?1 AND lemma_id IN ({})",
                placeholders(2, chunk.len())
            );
            let mut values: Vec<&dyn ToSql> = vec![&page_id];
            values.extend(chunk.iter().map(|l| l as &dyn ToSql));

            let sum: f64 = self
                .conn
                .query_row(&sql, values.as_slice(), |row| row.get(0))?;
            total += sum;
        }

        Ok(total)
    }

    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM lemmas WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_indexes(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM indexes i JOIN pages p ON p.id = i.page_id WHERE p.site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
