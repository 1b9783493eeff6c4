use super::{bind_id_list, lock, GuardedConnection, Page, PageTreeService};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;
use tracing::debug;

const LIST_PARENT_PAGES: &str = "parent_pages";

/// Page tree backed by the `pages` table.
///
/// Root pages are always part of the result as given, whether or not a page
/// with that uid exists. Descendants are collected breadth first, skipping
/// hidden and deleted pages together with everything below them.
#[derive(Clone)]
pub struct SqlitePageTree {
    conn: GuardedConnection,
}

impl SqlitePageTree {
    pub fn new(conn: GuardedConnection) -> Self {
        Self { conn }
    }

    fn visible_children(&self, parent_ids: &[u32]) -> Result<Vec<u32>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT uid FROM pages WHERE pid IN ({}) AND hidden = 0 AND deleted = 0 ORDER BY sorting, uid",
            bind_id_list(&conn, LIST_PARENT_PAGES, parent_ids)?
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let children = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<u32>>>()
            .context("Failed to read child pages")?;
        Ok(children)
    }
}

impl PageTreeService for SqlitePageTree {
    fn resolve_storage_pages(&self, root_ids: &[u32], depth: u32) -> Result<Vec<u32>> {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut resolved: Vec<u32> = Vec::new();
        let mut frontier: Vec<u32> = Vec::new();

        for &root in root_ids {
            if seen.insert(root) {
                resolved.push(root);
                frontier.push(root);
            }
        }

        for level in 0..depth {
            if frontier.is_empty() {
                break;
            }
            let children = self.visible_children(&frontier)?;
            frontier = children
                .into_iter()
                .filter(|uid| seen.insert(*uid))
                .collect();
            debug!(
                "Page tree level {} below {:?}: {} new pages",
                level + 1,
                root_ids,
                frontier.len()
            );
            resolved.extend_from_slice(&frontier);
        }

        Ok(resolved)
    }

    fn get_page(&self, uid: u32) -> Result<Option<Page>> {
        let conn = lock(&self.conn)?;
        let page = conn
            .query_row(
                "SELECT uid, pid, title FROM pages WHERE uid = ?1 AND hidden = 0 AND deleted = 0",
                params![uid],
                |row| {
                    Ok(Page {
                        uid: row.get(0)?,
                        pid: row.get(1)?,
                        title: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }
}
