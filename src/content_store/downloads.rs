use super::{
    bind_id_list, lock, Author, Category, Download, DownloadRepository, GuardedConnection,
};
use crate::listing::DownloadDemand;
use crate::server::metrics::record_db_query;
use anyhow::{Context, Result};
use rusqlite::{Connection, Row};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

const DOWNLOAD_COLUMNS: &str = "d.uid, d.pid, d.title, d.description, d.file_path, d.file_size, \
     d.created_at, a.uid, a.name, a.email";

const VISIBLE: &str = "d.hidden = 0 AND d.deleted = 0";

// Names of the id lists bound per query
const LIST_PAGES: &str = "download_pages";
const LIST_DOWNLOADS: &str = "download_uids";
const LIST_AUTHORS: &str = "download_authors";
const LIST_CATEGORIES: &str = "download_categories";
const LIST_CATEGORY_OWNERS: &str = "category_owners";

/// Download records backed by the `downloads` table.
#[derive(Clone)]
pub struct SqliteDownloadRepository {
    conn: GuardedConnection,
}

impl SqliteDownloadRepository {
    pub fn new(conn: GuardedConnection) -> Self {
        Self { conn }
    }

    fn row_to_download(row: &Row) -> rusqlite::Result<Download> {
        let author_uid: Option<u32> = row.get(7)?;
        let author = match author_uid {
            Some(uid) => Some(Author {
                uid,
                name: row.get(8)?,
                email: row.get(9)?,
            }),
            None => None,
        };
        Ok(Download {
            uid: row.get(0)?,
            pid: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            file_path: row.get(4)?,
            file_size: row.get(5)?,
            created_at: row.get(6)?,
            author,
            categories: Vec::new(),
        })
    }

    fn query_downloads(conn: &Connection, where_clause: &str) -> Result<Vec<Download>> {
        let sql = format!(
            "SELECT {} FROM downloads d LEFT JOIN authors a ON a.uid = d.author_id \
             WHERE {} ORDER BY d.sorting, d.uid",
            DOWNLOAD_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let downloads = stmt
            .query_map([], Self::row_to_download)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read downloads")?;
        Ok(downloads)
    }

    fn attach_categories(conn: &Connection, downloads: &mut [Download]) -> Result<()> {
        if downloads.is_empty() {
            return Ok(());
        }
        let uids: Vec<u32> = downloads.iter().map(|d| d.uid).collect();
        let sql = format!(
            "SELECT mm.download_id, c.uid, c.title, c.parent FROM download_category_mm mm \
             JOIN sys_category c ON c.uid = mm.category_id \
             WHERE mm.download_id IN ({}) ORDER BY mm.download_id, mm.sorting, c.uid",
            bind_id_list(conn, LIST_CATEGORY_OWNERS, &uids)?
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                Category {
                    uid: row.get(1)?,
                    title: row.get(2)?,
                    parent: row.get(3)?,
                },
            ))
        })?;

        let mut by_download: HashMap<u32, Vec<Category>> = HashMap::new();
        for row in rows {
            let (download_id, category) = row.context("Failed to read download categories")?;
            by_download.entry(download_id).or_default().push(category);
        }
        for download in downloads.iter_mut() {
            if let Some(categories) = by_download.remove(&download.uid) {
                download.categories = categories;
            }
        }
        Ok(())
    }
}

fn in_list(conn: &Connection, column: &str, list: &'static str, ids: &[u32]) -> Result<String> {
    Ok(format!("{} IN ({})", column, bind_id_list(conn, list, ids)?))
}

impl DownloadRepository for SqliteDownloadRepository {
    fn find_demanded(&self, demand: &DownloadDemand) -> Result<Vec<Download>> {
        let start = Instant::now();
        let conn = lock(&self.conn)?;
        let mut constraints: Vec<String> = vec![VISIBLE.to_string()];

        if !demand.page_ids().is_empty() {
            constraints.push(in_list(&conn, "d.pid", LIST_PAGES, demand.page_ids())?);
        }
        if !demand.download_ids().is_empty() {
            constraints.push(in_list(&conn, "d.uid", LIST_DOWNLOADS, demand.download_ids())?);
        }
        if !demand.author_ids().is_empty() {
            constraints.push(in_list(&conn, "d.author_id", LIST_AUTHORS, demand.author_ids())?);
        }
        if !demand.category_ids().is_empty() {
            let categories = in_list(&conn, "mm.category_id", LIST_CATEGORIES, demand.category_ids())?;
            constraints.push(format!(
                "EXISTS (SELECT 1 FROM download_category_mm mm WHERE mm.download_id = d.uid AND {})",
                categories
            ));
        }

        let mut downloads = Self::query_downloads(&conn, &constraints.join(" AND "))?;
        Self::attach_categories(&conn, &mut downloads)?;

        debug!("Found {} downloads for {:?}", downloads.len(), demand);
        record_db_query("find_demanded", start.elapsed());
        Ok(downloads)
    }

    fn find_by_ids(&self, ids: &[u32]) -> Result<Vec<Download>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let conn = lock(&self.conn)?;
        let where_clause = format!("{} AND {}", VISIBLE, in_list(&conn, "d.uid", LIST_DOWNLOADS, ids)?);

        let found = Self::query_downloads(&conn, &where_clause)?;
        let mut by_uid: HashMap<u32, Download> = found.into_iter().map(|d| (d.uid, d)).collect();

        // Requested order wins; removing from the map drops repeated ids.
        let mut downloads: Vec<Download> = ids.iter().filter_map(|id| by_uid.remove(id)).collect();
        Self::attach_categories(&conn, &mut downloads)?;

        debug!(
            "Found {} of {} selected downloads",
            downloads.len(),
            ids.len()
        );
        record_db_query("find_by_ids", start.elapsed());
        Ok(downloads)
    }
}
