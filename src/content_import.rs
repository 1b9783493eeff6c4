//! Import of content fixtures.
//!
//! A fixture is a JSON document holding the page tree, authors, categories,
//! downloads and listing content elements. Everything is written in a single
//! transaction: either the whole fixture lands or nothing does.

use crate::content_store::{lock, GuardedConnection, ListingPlugin};
use crate::listing::ListingSettings;
use anyhow::{Context, Result};
use rusqlite::params;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ContentFixture {
    pub pages: Vec<PageFixture>,
    pub authors: Vec<AuthorFixture>,
    pub categories: Vec<CategoryFixture>,
    pub downloads: Vec<DownloadFixture>,
    pub content_elements: Vec<ContentElementFixture>,
}

#[derive(Debug, Deserialize)]
pub struct PageFixture {
    pub uid: u32,
    #[serde(default)]
    pub pid: u32,
    pub title: String,
    #[serde(default)]
    pub sorting: i64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthorFixture {
    pub uid: u32,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    pub uid: u32,
    pub title: String,
    #[serde(default)]
    pub parent: u32,
}

#[derive(Debug, Deserialize)]
pub struct DownloadFixture {
    pub uid: u32,
    pub pid: u32,
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub author_id: Option<u32>,
    /// Category uids, in display order.
    #[serde(default)]
    pub categories: Vec<u32>,
    #[serde(default)]
    pub sorting: i64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    /// Unix timestamp, seconds. Import time when absent.
    pub created_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ContentElementFixture {
    pub uid: u32,
    pub pid: u32,
    pub plugin: ListingPlugin,
    pub header: Option<String>,
    #[serde(default)]
    pub settings: ListingSettings,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub pages: usize,
    pub authors: usize,
    pub categories: usize,
    pub downloads: usize,
    pub category_links: usize,
    pub content_elements: usize,
}

pub fn load_fixture(path: &Path) -> Result<ContentFixture> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file: {:?}", path))?;
    parse_fixture(&content).with_context(|| format!("Failed to parse fixture file: {:?}", path))
}

pub fn parse_fixture(json: &str) -> Result<ContentFixture> {
    Ok(serde_json::from_str(json)?)
}

/// Write the fixture into the content database.
///
/// Uids are kept as given, so importing a record that already exists fails
/// and rolls back the whole fixture.
pub fn import_content(conn: &GuardedConnection, fixture: &ContentFixture) -> Result<ImportSummary> {
    let mut guard = lock(conn)?;
    let tx = guard.transaction()?;
    let mut summary = ImportSummary::default();
    let now = chrono::Utc::now().timestamp();

    for page in &fixture.pages {
        tx.execute(
            "INSERT INTO pages (uid, pid, title, sorting, hidden, deleted) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![page.uid, page.pid, page.title, page.sorting, page.hidden, page.deleted],
        )
        .with_context(|| format!("Failed to import page {}", page.uid))?;
        summary.pages += 1;
    }

    for author in &fixture.authors {
        tx.execute(
            "INSERT INTO authors (uid, name, email) VALUES (?1, ?2, ?3)",
            params![author.uid, author.name, author.email],
        )
        .with_context(|| format!("Failed to import author {}", author.uid))?;
        summary.authors += 1;
    }

    for category in &fixture.categories {
        tx.execute(
            "INSERT INTO sys_category (uid, title, parent) VALUES (?1, ?2, ?3)",
            params![category.uid, category.title, category.parent],
        )
        .with_context(|| format!("Failed to import category {}", category.uid))?;
        summary.categories += 1;
    }

    for download in &fixture.downloads {
        tx.execute(
            "INSERT INTO downloads (uid, pid, title, description, file_path, file_size, author_id, sorting, hidden, deleted, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                download.uid,
                download.pid,
                download.title,
                download.description,
                download.file_path,
                download.file_size,
                download.author_id,
                download.sorting,
                download.hidden,
                download.deleted,
                download.created_at.unwrap_or(now),
            ],
        )
        .with_context(|| format!("Failed to import download {}", download.uid))?;
        summary.downloads += 1;

        for (sorting, category_id) in download.categories.iter().enumerate() {
            tx.execute(
                "INSERT INTO download_category_mm (download_id, category_id, sorting) VALUES (?1, ?2, ?3)",
                params![download.uid, category_id, sorting as i64],
            )
            .with_context(|| {
                format!(
                    "Failed to link download {} to category {}",
                    download.uid, category_id
                )
            })?;
            summary.category_links += 1;
        }
    }

    for element in &fixture.content_elements {
        let settings = serde_json::to_string(&element.settings)?;
        tx.execute(
            "INSERT INTO content_elements (uid, pid, plugin, header, settings, hidden, deleted) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                element.uid,
                element.pid,
                element.plugin.as_str(),
                element.header,
                settings,
                element.hidden,
                element.deleted,
            ],
        )
        .with_context(|| format!("Failed to import content element {}", element.uid))?;
        summary.content_elements += 1;
    }

    tx.commit()?;
    debug!("Imported {:?}", summary);
    info!(
        "Imported {} pages, {} downloads, {} content elements",
        summary.pages, summary.downloads, summary.content_elements
    );
    Ok(summary)
}
