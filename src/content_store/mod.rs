//! Content database access.
//!
//! The listing controller only sees the traits declared here; the SQLite
//! implementations share one connection to the content database.

mod content_elements;
mod downloads;
mod models;
mod pages;
mod schema;

pub use content_elements::SqliteContentElementStore;
pub use downloads::SqliteDownloadRepository;
pub use models::*;
pub use pages::SqlitePageTree;
pub use schema::CONTENT_VERSIONED_SCHEMAS;

use crate::listing::DownloadDemand;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

pub type GuardedConnection = Arc<Mutex<Connection>>;

/// Retrieval of download records.
pub trait DownloadRepository: Send + Sync {
    /// Find the visible downloads matching every populated criterion of the demand.
    fn find_demanded(&self, demand: &DownloadDemand) -> Result<Vec<Download>>;

    /// Find the visible downloads with the given uids, in the order requested.
    fn find_by_ids(&self, ids: &[u32]) -> Result<Vec<Download>>;
}

/// Page tree traversal and lookup.
pub trait PageTreeService: Send + Sync {
    /// Expand the root pages with their descendants up to `depth` levels.
    fn resolve_storage_pages(&self, root_ids: &[u32], depth: u32) -> Result<Vec<u32>>;

    /// Get a visible page by uid.
    fn get_page(&self, uid: u32) -> Result<Option<Page>>;
}

/// Lookup of the listing plugins placed on pages.
pub trait ContentElementStore: Send + Sync {
    /// Get a visible content element by uid.
    fn get_content_element(&self, uid: u32) -> Result<Option<ContentElement>>;
}

/// Open (or create) the content database at `db_path`.
///
/// A fresh file gets the latest schema; an existing one must carry a known
/// schema version and match it.
pub fn open_content_db<P: AsRef<Path>>(db_path: P) -> Result<GuardedConnection> {
    let path = db_path.as_ref();
    let is_new_db = !path.exists();

    let conn = Connection::open(path).context("Failed to open content database")?;
    conn.execute("PRAGMA foreign_keys = ON;", [])?;

    let latest_schema = CONTENT_VERSIONED_SCHEMAS
        .last()
        .ok_or_else(|| anyhow!("No content schema defined"))?;

    if is_new_db {
        info!("Creating new content database at {:?}", path);
        latest_schema.create(&conn)?;
    } else {
        let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let db_version = raw_version - BASE_DB_VERSION as i64;

        if db_version < 1 {
            bail!(
                "Content database version {} is invalid (expected >= 1)",
                db_version
            );
        }

        let schema = CONTENT_VERSIONED_SCHEMAS
            .iter()
            .find(|s| s.version as i64 == db_version)
            .with_context(|| format!("Unknown content database version {}", db_version))?;
        schema.validate(&conn).with_context(|| {
            format!(
                "Content database schema validation failed for version {}",
                db_version
            )
        })?;
    }

    Ok(Arc::new(Mutex::new(conn)))
}

/// Open an in-memory content database with the latest schema.
pub fn open_in_memory_content_db() -> Result<GuardedConnection> {
    let conn = Connection::open_in_memory()?;
    CONTENT_VERSIONED_SCHEMAS
        .last()
        .ok_or_else(|| anyhow!("No content schema defined"))?
        .create(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn lock(conn: &GuardedConnection) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("Content database connection lock poisoned"))
}

/// Store `ids` as the id list named `list` and return a subquery selecting them.
///
/// Lists live in a per-connection temp table, so a list of any length costs a
/// single subquery instead of one bound variable per id. Binding a list
/// replaces whatever that name held before; the caller must hold the
/// connection lock until the subquery has run.
pub(crate) fn bind_id_list(conn: &Connection, list: &'static str, ids: &[u32]) -> Result<String> {
    conn.execute_batch(
        "CREATE TEMP TABLE IF NOT EXISTS id_list (
             list TEXT NOT NULL,
             position INTEGER NOT NULL,
             id INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS temp.idx_id_list ON id_list (list, id);",
    )?;

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM temp.id_list WHERE list = ?1", params![list])?;
    {
        let mut insert =
            tx.prepare_cached("INSERT INTO temp.id_list (list, position, id) VALUES (?1, ?2, ?3)")?;
        for (position, id) in ids.iter().enumerate() {
            insert.execute(params![list, position as i64, id])?;
        }
    }
    tx.commit()
        .with_context(|| format!("Failed to bind id list {}", list))?;

    Ok(format!("SELECT id FROM temp.id_list WHERE list = '{}'", list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_and_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("content.db");

        {
            let conn = open_content_db(&db_path).unwrap();
            lock(&conn)
                .unwrap()
                .execute("INSERT INTO pages (uid, title) VALUES (1, 'Home')", [])
                .unwrap();
        }

        let conn = open_content_db(&db_path).unwrap();
        let title: String = lock(&conn)
            .unwrap()
            .query_row("SELECT title FROM pages WHERE uid = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(title, "Home");
    }

    #[test]
    fn test_open_rejects_foreign_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("content.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute("CREATE TABLE something (id INTEGER)", [])
                .unwrap();
        }

        let err = open_content_db(&db_path).unwrap_err().to_string();
        assert!(err.contains("invalid"), "unexpected error: {}", err);
    }

    #[test]
    fn test_bind_id_list_replaces_previous_ids() {
        let conn = open_in_memory_content_db().unwrap();
        let guard = lock(&conn).unwrap();

        bind_id_list(&guard, "test", &[3, 1, 2]).unwrap();
        let subquery = bind_id_list(&guard, "test", &[7, 7, 5]).unwrap();

        let mut stmt = guard
            .prepare(&format!("{} ORDER BY position", subquery))
            .unwrap();
        let ids: Vec<u32> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(ids, vec![7, 7, 5]);
    }

    #[test]
    fn test_bind_id_list_beyond_sqlite_variable_limit() {
        let conn = open_in_memory_content_db().unwrap();
        let guard = lock(&conn).unwrap();
        let ids: Vec<u32> = (1..=40_000).collect();

        let subquery = bind_id_list(&guard, "test", &ids).unwrap();
        let count: i64 = guard
            .query_row(&format!("SELECT COUNT(*) FROM ({})", subquery), [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 40_000);
    }
}
