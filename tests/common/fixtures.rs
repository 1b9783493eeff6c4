//! Test content creation
//!
//! Writes the test fixture into a fresh content database in a temp dir.

use anyhow::Result;
use download_listing_server::content_import::{import_content, parse_fixture};
use download_listing_server::open_content_db;
use std::path::PathBuf;
use tempfile::TempDir;

const TEST_CONTENT: &str = r#"{
    "pages": [
        {"uid": 1, "title": "Home"},
        {"uid": 10, "pid": 1, "title": "Downloads"},
        {"uid": 101, "pid": 10, "title": "Reports"},
        {"uid": 1011, "pid": 101, "title": "Archive"},
        {"uid": 102, "pid": 10, "title": "Forms", "sorting": 1},
        {"uid": 103, "pid": 10, "title": "Drafts", "sorting": 2, "hidden": true},
        {"uid": 20, "pid": 1, "title": "Other", "sorting": 1}
    ],
    "authors": [
        {"uid": 1, "name": "Ada", "email": "ada@example.org"},
        {"uid": 2, "name": "Brian"}
    ],
    "categories": [
        {"uid": 3, "title": "Reports"},
        {"uid": 4, "title": "Forms"},
        {"uid": 5, "title": "Misc"}
    ],
    "downloads": [
        {"uid": 501, "pid": 10, "title": "Price list", "author_id": 1,
         "categories": [5], "file_path": "fileadmin/prices.pdf", "file_size": 1024,
         "created_at": 1700000000},
        {"uid": 502, "pid": 101, "title": "Annual report 2023", "author_id": 1,
         "categories": [3], "created_at": 1700000000},
        {"uid": 503, "pid": 102, "title": "Order form", "author_id": 2,
         "categories": [4], "created_at": 1700000000},
        {"uid": 504, "pid": 1011, "title": "Annual report 2019", "author_id": 2,
         "categories": [3], "created_at": 1700000000},
        {"uid": 505, "pid": 101, "title": "Draft report", "categories": [3],
         "hidden": true, "created_at": 1700000000},
        {"uid": 506, "pid": 20, "title": "Other file", "author_id": 1,
         "categories": [3], "created_at": 1700000000}
    ],
    "content_elements": [
        {"uid": 900, "pid": 10, "plugin": "list", "header": "Reports and forms",
         "settings": {"listPid": "10", "recursion_depth": 1, "categoriesList": "3,4"}},
        {"uid": 901, "pid": 10, "plugin": "list_selected",
         "settings": {"listSelectedDownloads": "503,501,999"}},
        {"uid": 902, "pid": 20, "plugin": "list", "hidden": true}
    ]
}"#;

/// Creates a temp dir with a populated `content.db`.
///
/// Returns the dir (keep it alive) and the database path.
pub fn create_test_content_db() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("content.db");

    let conn = open_content_db(&db_path)?;
    import_content(&conn, &parse_fixture(TEST_CONTENT)?)?;

    Ok((temp_dir, db_path))
}
